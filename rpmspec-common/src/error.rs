//! [`ParseErr`] used in rpmspec-extract.
//!
//! Field accessors never surface these; they fold them into an empty result.
//! Loading macros and reading spec files from streams do propagate them.
use std::path::PathBuf;

use smartstring::alias::String;
use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseErr>;

/// Errors for macro loading, substitution and field extraction
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ParseErr {
    /// The pattern did not match anything.
    #[error("No submatches found")]
    NoSubmatches,
    /// The pattern captured fewer groups than the caller asked for.
    #[error("Too few submatches: expected {expected}, found {found}")]
    TooFewSubmatches { expected: usize, found: usize },
    /// The pattern captured more groups than the caller asked for.
    #[error("Too many submatches: expected {expected}, found {found}")]
    TooManySubmatches { expected: usize, found: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    /// A macro source was given that is not a regular file (e.g. a directory).
    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),
    #[error("Invalid glob pattern `{pattern}`: {err}")]
    BadGlob { pattern: String, err: glob::PatternError },

    /// Zero bytes were read from a stream.
    #[error("Zero-length data, nothing to parse")]
    EmptyInput,

    /// The macro name can never appear inside `%{...}`.
    #[error("Bad macro name: `{0}`")]
    BadMacroName(String),

    #[error("Not implemented: {0}")]
    Unimplemented(&'static str),
}

impl From<glob::GlobError> for ParseErr {
    fn from(value: glob::GlobError) -> Self {
        Self::IoError(value.into_error())
    }
}

impl ParseErr {
    /// Whether this is one of the structural errors that field accessors turn into an empty result.
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        matches!(self, Self::NoSubmatches | Self::TooFewSubmatches { .. } | Self::TooManySubmatches { .. })
    }
}
