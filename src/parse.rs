//! Field extraction for rpmspec. See [`RPMSpec`].
use crate::error::{ParseErr as PE, ParseResult};
use crate::macros::{MacroSet, RPMMacro};
use itertools::Itertools;
use regex::Regex;
use rpmspec_common::util::{self, find_all_submatches, find_submatch};
use smartstring::alias::String;
use std::{borrow::Cow, collections::BTreeMap, io::Read, path::Path};
use tracing::{debug, trace, warn};

lazy_static::lazy_static! {
    static ref RE_NAME:     Regex = Regex::new(r"(?m)^[Nn]ame:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_VERSION:  Regex = Regex::new(r"(?m)^[Vv]ersion:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_RELEASE:  Regex = Regex::new(r"(?m)^Release:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_SUMMARY:  Regex = Regex::new(r"(?m)^Summary:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_LICENSE:  Regex = Regex::new(r"(?m)^License:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_GROUP:    Regex = Regex::new(r"(?m)^Group:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_URL:      Regex = Regex::new(r"(?m)^URL:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_REQ:      Regex = Regex::new(r"(?m)^Requires:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_BREQ:     Regex = Regex::new(r"(?m)^BuildRequires:[ \t]+([^\r\n]+)").unwrap();
    static ref RE_SUBPKG:   Regex = Regex::new(r"(?m)^%package[ \t]+([^\r\n]+)").unwrap();
    static ref RE_SOURCE:   Regex = Regex::new(r"(?m)^Source(\d{1,3}):[ \t]+([^\r\n]+)").unwrap();
    static ref RE_PATCH:    Regex = Regex::new(r"(?m)^Patch(\d{1,3}):[ \t]+([^\r\n]+)").unwrap();
    static ref RE_DIST:     Regex = Regex::new(r"%\{\??dist\}").unwrap();
}

/// A parsed spec file.
///
/// Holds the raw bytes and the macros defined in them. Every accessor re-reads the raw
/// text; nothing is cached and nothing can be changed after parsing.
///
/// A field that cannot be found is not an error: string accessors return `""`, list
/// accessors return an empty list and [`RPMSpec::sources`]/[`RPMSpec::patches`] return
/// [`None`].
///
/// # Examples
/// ```
/// use rpmspec_extract::RPMSpec;
///
/// let spec = RPMSpec::parse_str("Name: hai\nVersion: 1.0\nRelease: 2%{?dist}\nSource0: %{name}-%{version}.tar.gz\n");
/// assert_eq!(spec.release(), "2");
/// assert_eq!(spec.sources().unwrap()["0"], "hai-1.0.tar.gz");
/// ```
#[derive(Clone, Debug, Default)]
pub struct RPMSpec {
    raw: Box<[u8]>,
    macros: MacroSet,
}

impl RPMSpec {
    /// Parses spec data held in memory. Empty input is accepted.
    ///
    /// `name`, `version` and `release` become macros unless the file already
    /// `%define`s or `%global`s them.
    #[must_use]
    pub fn parse(data: impl Into<Box<[u8]>>) -> Self {
        Self::parse_with_macros(data, MacroSet::new())
    }

    /// Same as [`RPMSpec::parse`] but for a string.
    #[must_use]
    pub fn parse_str(data: &str) -> Self {
        Self::parse(data.as_bytes())
    }

    /// Parses spec data on top of predefined macros (e.g. loaded with [`MacroSet::from_paths`]).
    ///
    /// Definitions in the spec override `base`. The implicit `name`, `version` and
    /// `release` macros also override `base` unless the spec defines them itself.
    #[must_use]
    pub fn parse_with_macros(data: impl Into<Box<[u8]>>, base: MacroSet) -> Self {
        let mut spec = Self { raw: data.into(), macros: MacroSet::new() };
        let defs = MacroSet::parse_definitions(&spec.text());
        let mut macros = base;
        // extracted without substitution, so the macros are not needed yet
        for (name, value) in [("name", spec.name()), ("version", spec.version()), ("release", spec.release())] {
            if !defs.contains(name) {
                debug!(name, value = ?value, "Synthesizing implicit macro");
                macros.insert(RPMMacro::new(name, value, false));
            }
        }
        macros.update(defs);
        spec.macros = macros;
        spec
    }

    /// Reads a whole stream and parses it.
    ///
    /// # Errors
    /// - [`PE::IoError`] if reading fails
    /// - [`PE::EmptyInput`] if the stream is empty
    pub fn from_reader<R: Read>(r: R) -> ParseResult<Self> {
        Ok(Self::parse(util::read_stream(r)?))
    }

    /// Reads a spec file from disk and parses it.
    ///
    /// # Errors
    /// - [`PE::NotAFile`] / [`PE::IoError`] if the file cannot be read
    /// - [`PE::EmptyInput`] if the file is empty
    #[tracing::instrument(skip_all, fields(path = ?path.as_ref().display()))]
    pub fn from_path(path: impl AsRef<Path>) -> ParseResult<Self> {
        let data = util::read_file(path.as_ref())?;
        if data.is_empty() {
            return Err(PE::EmptyInput);
        }
        Ok(Self::parse(data))
    }

    /// The bytes this spec was parsed from.
    #[must_use]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Macros defined in the spec, plus the implicit ones and any predefined macros.
    #[must_use]
    pub const fn macros(&self) -> &MacroSet {
        &self.macros
    }

    fn text(&self) -> Cow<'_, str> {
        std::string::String::from_utf8_lossy(&self.raw)
    }

    fn field(&self, re: &Regex, field: &str) -> String {
        match find_submatch::<1>(re, &self.text()) {
            Ok([value]) => value.into(),
            Err(e) => {
                debug!(field, %e, "Field not found");
                String::new()
            }
        }
    }

    /// `Name:` of the main package, without macro substitution.
    #[must_use]
    pub fn name(&self) -> String {
        self.field(&RE_NAME, "Name")
    }

    /// `Version:`, without macro substitution.
    #[must_use]
    pub fn version(&self) -> String {
        self.field(&RE_VERSION, "Version")
    }

    /// `Release:` with the dist tag (`%{?dist}` or `%{dist}`) removed.
    ///
    /// No other macros are substituted.
    #[must_use]
    pub fn release(&self) -> String {
        let rel = self.field(&RE_RELEASE, "Release");
        String::from(&*RE_DIST.replace_all(&rel, ""))
    }

    /// The first `Summary:`, which belongs to the main package.
    #[must_use]
    pub fn summary(&self) -> String {
        self.field(&RE_SUMMARY, "Summary")
    }

    /// `License:`, without macro substitution.
    #[must_use]
    pub fn license(&self) -> String {
        self.field(&RE_LICENSE, "License")
    }

    /// `Group:`, without macro substitution.
    #[must_use]
    pub fn group(&self) -> String {
        self.field(&RE_GROUP, "Group")
    }

    /// `URL:`, without macro substitution.
    #[must_use]
    pub fn url(&self) -> String {
        self.field(&RE_URL, "URL")
    }

    /// Names given to `%package`, in order of declaration. Duplicates are kept.
    ///
    /// `%package -n foo` is returned as `-n foo`.
    #[must_use]
    pub fn subpackages(&self) -> Vec<String> {
        match find_all_submatches::<1>(&RE_SUBPKG, &self.text()) {
            Ok(pkgs) => pkgs.into_iter().map(|[pkg]| pkg.into()).collect(),
            Err(e) => {
                debug!(%e, "No subpackages");
                vec![]
            }
        }
    }

    /// `SourceN:` values keyed by `N`, with macros substituted.
    ///
    /// Returns [`None`] if there are no `SourceN:` lines.
    #[must_use]
    pub fn sources(&self) -> Option<BTreeMap<String, String>> {
        self.list_preamble(&RE_SOURCE, "Source")
    }

    /// `PatchN:` values keyed by `N`, with macros substituted.
    ///
    /// Returns [`None`] if there are no `PatchN:` lines.
    #[must_use]
    pub fn patches(&self) -> Option<BTreeMap<String, String>> {
        self.list_preamble(&RE_PATCH, "Patch")
    }

    fn list_preamble(&self, re: &Regex, name: &str) -> Option<BTreeMap<String, String>> {
        let text = self.text();
        let lines = match find_all_submatches::<2>(re, &text) {
            Ok(lines) => lines,
            Err(e) => {
                debug!(preamble = name, %e, "No list preambles");
                return None;
            }
        };
        let mut out = BTreeMap::new();
        for [digit, value] in lines {
            let value = match Self::macro_sub(value, &self.macros) {
                Ok(value) => value,
                Err(e) => {
                    warn!(preamble = name, digit, %e, "Macro substitution failed");
                    return None;
                }
            };
            if let Some(old) = out.insert(String::from(digit), value) {
                warn!("Overriding preamble `{name}{digit}` value `{old}`");
            }
        }
        Some(out)
    }

    /// Dependencies from every `BuildRequires:` line, with macros substituted.
    ///
    /// Comma-separated entries are split and trimmed. Each entry appears once, in
    /// order of first appearance.
    #[must_use]
    pub fn build_requires(&self) -> Vec<String> {
        self.deps(&RE_BREQ, "BuildRequires")
    }

    /// Dependencies from every `Requires:` line (main package and subpackages alike).
    ///
    /// Same rules as [`RPMSpec::build_requires`]; `BuildRequires:` lines are not included.
    #[must_use]
    pub fn requires(&self) -> Vec<String> {
        self.deps(&RE_REQ, "Requires")
    }

    fn deps(&self, re: &Regex, name: &str) -> Vec<String> {
        let text = self.text();
        let lines = match find_all_submatches::<1>(re, &text) {
            Ok(lines) => lines,
            Err(e) => {
                debug!(preamble = name, %e, "No dependencies");
                return vec![];
            }
        };
        let mut deps = vec![];
        for [line] in lines {
            match Self::macro_sub(line, &self.macros) {
                Ok(line) => deps.extend(line.split(',').map(str::trim).filter(|d| !d.is_empty()).map(String::from)),
                Err(e) => {
                    warn!(preamble = name, %e, "Macro substitution failed");
                    return vec![];
                }
            }
        }
        deps.into_iter().unique().collect()
    }

    /// Replaces every `%{NAME}` in `text` with the value of the macro `NAME`.
    ///
    /// This is a single pass over `macros` in no particular order. A value that
    /// contains another `%{...}` is only resolved if that macro happens to be
    /// visited later, so nested references may be left as they are. Other macro
    /// forms (`%name`, `%{?name}`, `%(shell)`) are never touched.
    ///
    /// # Examples
    /// ```
    /// use rpmspec_extract::{macros::{MacroSet, RPMMacro}, RPMSpec};
    ///
    /// let ms: MacroSet = [RPMMacro::new("name", "go", false)].into_iter().collect();
    /// assert_eq!(RPMSpec::macro_sub("%{name}-%name", &ms)?, "go-%name");
    /// # Ok::<(), rpmspec_extract::error::ParseErr>(())
    /// ```
    ///
    /// # Errors
    /// [`PE::BadMacroName`] if a macro name is empty or contains whitespace or braces,
    /// since such a name cannot be referenced as `%{NAME}`.
    pub fn macro_sub(text: &str, macros: &MacroSet) -> ParseResult<String> {
        let mut dest = std::string::String::from(text);
        for m in macros.iter() {
            dest = dest.replace(&Self::sub_pattern(m.name())?, m.value());
        }
        trace!(?text, ?dest, "Substituted macros");
        Ok(dest.into())
    }

    fn sub_pattern(name: &str) -> ParseResult<std::string::String> {
        if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == '{' || c == '}') {
            return Err(PE::BadMacroName(name.into()));
        }
        Ok(format!("%{{{name}}}"))
    }
}
