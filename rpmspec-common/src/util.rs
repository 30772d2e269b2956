//! Utilities used in `rpmspec-extract`.
//!
//! The submatch finders are the low-level matchers behind every field accessor,
//! and the readers are the only way the crate touches files and streams.
use regex::Regex;
use std::{io::Read, path::Path};
use tracing::trace;

use crate::error::{ParseErr, ParseResult};

fn check_len(found: usize, expected: usize) -> ParseResult<()> {
    match found.cmp(&expected) {
        std::cmp::Ordering::Less => Err(ParseErr::TooFewSubmatches { expected, found }),
        std::cmp::Ordering::Greater => Err(ParseErr::TooManySubmatches { expected, found }),
        std::cmp::Ordering::Equal => Ok(()),
    }
}

/// Finds the first match of `re` in `hay` and returns its `N` capture groups.
///
/// Groups that did not participate in the match come back as `""`.
///
/// # Errors
/// - [`ParseErr::NoSubmatches`] if nothing matched
/// - [`ParseErr::TooFewSubmatches`] / [`ParseErr::TooManySubmatches`] if `re` does not have
///   exactly `N` capture groups
pub fn find_submatch<'h, const N: usize>(re: &Regex, hay: &'h str) -> ParseResult<[&'h str; N]> {
    let caps = re.captures(hay).ok_or(ParseErr::NoSubmatches)?;
    check_len(caps.len(), N + 1)?;
    Ok(std::array::from_fn(|i| caps.get(i + 1).map_or("", |m| m.as_str())))
}

/// Finds every match of `re` in `hay`, in document order, and returns the `N` capture groups of each.
///
/// # Errors
/// Same as [`find_submatch`]. A single malformed match fails the whole call.
pub fn find_all_submatches<'h, const N: usize>(re: &Regex, hay: &'h str) -> ParseResult<Vec<[&'h str; N]>> {
    let mut out = vec![];
    for caps in re.captures_iter(hay) {
        check_len(caps.len(), N + 1)?;
        out.push(std::array::from_fn(|i| caps.get(i + 1).map_or("", |m| m.as_str())));
    }
    if out.is_empty() {
        return Err(ParseErr::NoSubmatches);
    }
    trace!(re = re.as_str(), count = out.len(), "found submatches");
    Ok(out)
}

/// Reads a regular file into memory.
///
/// # Errors
/// - [`ParseErr::NotAFile`] if `path` exists but is not a regular file (e.g. a directory)
/// - [`ParseErr::IoError`] if it cannot be stat'ed or read
pub fn read_file(path: &Path) -> ParseResult<Vec<u8>> {
    if !path.metadata()?.is_file() {
        return Err(ParseErr::NotAFile(path.to_path_buf()));
    }
    Ok(std::fs::read(path)?)
}

/// Reads everything left in a stream.
///
/// # Errors
/// - [`ParseErr::IoError`] if reading fails
/// - [`ParseErr::EmptyInput`] if the stream yields zero bytes
pub fn read_stream<R: Read>(mut r: R) -> ParseResult<Vec<u8>> {
    let mut buf = vec![];
    r.read_to_end(&mut buf)?;
    if buf.is_empty() {
        return Err(ParseErr::EmptyInput);
    }
    Ok(buf)
}
