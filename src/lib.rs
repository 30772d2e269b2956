//! # rpmspec-extract
//! Metadata extraction for RPM spec files.
//!
//! RPMs are built from sources using a spec file. The spec file
//! contains information on how to build the package, what files to include,
//! and what dependencies are required.
//!
//! This crate reads the declarative preambles (`Name:`, `SourceN:`, `Requires:`, ...)
//! and the `%define`/`%global` macros of a spec file. Macro references of the form
//! `%{name}` are substituted in sources, patches and dependencies; everything else
//! (conditionals, scriptlets, `%description`) is left untouched.
//!
//! ```
//! use rpmspec_extract::RPMSpec;
//!
//! let spec = RPMSpec::parse_str("Name: hai\nVersion: 1\nRequires: %{name}-libs = %{version}\n");
//! assert_eq!(spec.requires(), vec!["hai-libs = 1"]);
//! ```
#![warn(clippy::disallowed_types)]
#![warn(missing_docs)]
#![warn(clippy::complexity)]
#![warn(clippy::correctness)]
#![warn(clippy::nursery)]
#![warn(clippy::pedantic)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
// followings are from clippy::restriction
#![warn(clippy::missing_errors_doc)]
#![warn(clippy::missing_panics_doc)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::get_unwrap)]
#![allow(clippy::missing_inline_in_public_items)]
#![allow(clippy::implicit_return)]
#![allow(clippy::blanket_clippy_restriction_lints)]
#![allow(clippy::module_name_repetitions)]

pub mod macros;
pub mod parse;

pub use macros::{MacroSet, RPMMacro};
pub use parse::RPMSpec;
pub use rpmspec_common::{error, util};
