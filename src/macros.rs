//! User-defined macros: [`RPMMacro`], the [`MacroSet`] that holds them, and the
//! `%define`/`%global` scanner that fills it.
//!
//! Only literal `%{name}` substitution is supported (see [`crate::RPMSpec::macro_sub`]).
//! Parameterized macros, conditionals and built-ins such as `%lua` are kept as
//! plain text values.
use crate::error::{ParseErr as PE, ParseResult};
use regex::Regex;
use rpmspec_common::util;
use smartstring::alias::String;
use std::{collections::HashMap, path::Path};
use tracing::{debug, trace};

lazy_static::lazy_static! {
	static ref RE_DEFINE: Regex = Regex::new(r"(?m)^[ \t]*%(define|global)[ \t]+(\S+)[ \t]+([^\r\n]*)").unwrap();
}

/// A macro defined with `%define` or `%global`.
///
/// Equality compares the raw name, value and scope flag; no expansion happens.
///
/// # Examples
/// ```
/// use rpmspec_extract::macros::RPMMacro;
///
/// let m = RPMMacro::new("_prefix", "/usr", true);
/// assert_eq!(m.to_string(), "%global _prefix /usr");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct RPMMacro {
	/// Name of the macro, as referenced by `%{name}`
	pub name: String,
	/// Raw replacement text. May contain further macro references.
	pub value: String,
	/// `%global` if true, `%define` otherwise.
	///
	/// Substitution treats both the same; the flag only decides how the macro is written out.
	pub global: bool,
}

impl RPMMacro {
	/// Creates a new macro. The name is not validated.
	#[must_use]
	pub fn new(name: impl Into<String>, value: impl Into<String>, global: bool) -> Self {
		Self { name: name.into(), value: value.into(), global }
	}

	/// Name of the macro.
	#[must_use]
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Raw replacement text.
	#[must_use]
	pub fn value(&self) -> &str {
		&self.value
	}

	/// Whether this is a `%global`.
	#[must_use]
	pub const fn is_global(&self) -> bool {
		self.global
	}
}

/// Writes the macro the way it would appear in a spec or macro file, so it can be loaded back in.
impl std::fmt::Display for RPMMacro {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let kw = if self.global { "global" } else { "define" };
		write!(f, "%{kw} {} {}", self.name, self.value)
	}
}

/// Macros keyed by name. Inserting a name that already exists replaces the old definition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MacroSet(HashMap<String, RPMMacro>);

impl MacroSet {
	/// Creates an empty set.
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Inserts a macro, returning the definition it replaced.
	pub fn insert(&mut self, m: RPMMacro) -> Option<RPMMacro> {
		let old = self.0.insert(m.name.clone(), m);
		if let Some(old) = &old {
			trace!(name = ?old.name, old = ?old.value, "Overriding macro");
		}
		old
	}

	/// Looks up a macro by name.
	#[must_use]
	pub fn get(&self, name: &str) -> Option<&RPMMacro> {
		self.0.get(name)
	}

	/// Whether a macro with this name is defined.
	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	/// Removes a macro, like `%undefine`.
	pub fn remove(&mut self, name: &str) -> Option<RPMMacro> {
		self.0.remove(name)
	}

	/// Number of macros.
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// Whether no macro is defined.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Iterates over the macros in no particular order.
	pub fn iter(&self) -> impl Iterator<Item = &RPMMacro> {
		self.0.values()
	}

	/// Names of all macros, in no particular order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(|k| k.as_str())
	}

	/// Merges `other` into this set. Macros in `other` win on name clashes.
	pub fn update(&mut self, other: Self) {
		for m in other {
			self.insert(m);
		}
	}

	/// Scans `text` for `%define NAME VALUE` and `%global NAME VALUE` statements.
	///
	/// Statements must start a line (indentation is allowed), so commented-out
	/// definitions are ignored. The value is the rest of the line and may be empty.
	/// When a name is defined more than once, the last definition in the text wins.
	///
	/// # Examples
	/// ```
	/// use rpmspec_extract::macros::{MacroSet, RPMMacro};
	///
	/// let ms = MacroSet::parse_definitions("%define a 1\n%global a 2\n");
	/// assert_eq!(ms.get("a"), Some(&RPMMacro::new("a", "2", true)));
	/// ```
	#[must_use]
	pub fn parse_definitions(text: &str) -> Self {
		let mut ms = Self::new();
		for caps in RE_DEFINE.captures_iter(text) {
			let (Some(kw), Some(name), Some(value)) = (caps.get(1), caps.get(2), caps.get(3)) else {
				continue;
			};
			trace!(name = name.as_str(), "Insert macro");
			ms.insert(RPMMacro::new(name.as_str(), value.as_str(), kw.as_str() == "global"));
		}
		ms
	}

	/// Loads all macros defined in a file.
	///
	/// Anything that is not a `%define`/`%global` line is ignored.
	///
	/// # Errors
	/// - [`PE::NotAFile`] if `path` is a directory or another non-regular file
	/// - [`PE::IoError`] when it fails to open/read the file
	#[tracing::instrument]
	pub fn load_file(path: &Path) -> ParseResult<Self> {
		debug!("Loading macros from file");
		let data = util::read_file(path)?;
		Ok(Self::parse_definitions(&std::string::String::from_utf8_lossy(&data)))
	}

	/// Loads and merges macro files in order, e.g. `~/.rpmmacros` followed by a project file.
	///
	/// Later files override earlier ones.
	///
	/// # Errors
	/// The first file that fails to load (see [`MacroSet::load_file`]) aborts the whole load.
	pub fn from_paths<I, P>(paths: I) -> ParseResult<Self>
	where
		I: IntoIterator<Item = P>,
		P: AsRef<Path>,
	{
		let mut ms = Self::new();
		for path in paths {
			ms.update(Self::load_file(path.as_ref())?);
		}
		Ok(ms)
	}

	/// Loads every file matching a glob pattern such as `/usr/lib/rpm/macros.d/macros.*`.
	///
	/// Matches are merged in the order `glob` yields them (sorted by path).
	///
	/// # Errors
	/// - [`PE::BadGlob`] if the pattern is invalid
	/// - [`PE::NotAFile`] if a match is a directory
	/// - [`PE::IoError`] if a match cannot be read
	pub fn load_glob(pattern: &str) -> ParseResult<Self> {
		let paths = glob::glob(pattern).map_err(|err| PE::BadGlob { pattern: pattern.into(), err })?;
		let mut ms = Self::new();
		for path in paths {
			ms.update(Self::load_file(&path?)?);
		}
		Ok(ms)
	}
}

impl FromIterator<RPMMacro> for MacroSet {
	fn from_iter<T: IntoIterator<Item = RPMMacro>>(iter: T) -> Self {
		let mut ms = Self::new();
		ms.extend(iter);
		ms
	}
}

impl Extend<RPMMacro> for MacroSet {
	fn extend<T: IntoIterator<Item = RPMMacro>>(&mut self, iter: T) {
		for m in iter {
			self.insert(m);
		}
	}
}

impl IntoIterator for MacroSet {
	type Item = RPMMacro;
	type IntoIter = std::collections::hash_map::IntoValues<String, RPMMacro>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_values()
	}
}

/// Expands every macro reference in `content`, recursively.
///
/// Not supported. Use [`crate::RPMSpec::macro_sub`] for single-pass `%{name}` substitution.
///
/// # Errors
/// Always returns [`PE::Unimplemented`].
pub fn expand_macros(content: &str, macros: &MacroSet) -> ParseResult<String> {
	debug!(len = content.len(), macros = macros.len(), "Refusing recursive macro expansion");
	Err(PE::Unimplemented("recursive macro expansion"))
}
