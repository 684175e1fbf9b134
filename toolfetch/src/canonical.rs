//! Version-free directory names for extracted tools.
//!
//! Toolchain archives unpack into directories such as
//! `xtensa-lx106-elf-gcc-1.22.0-103-gb8e7818-5.2.0`. Keeping only the leading
//! hyphen-separated groups that start with a lowercase letter yields a name
//! that stays stable across releases (`xtensa-lx106-elf-gcc`).

use regex::Regex;
use std::sync::OnceLock;

/// Groups starting with a lowercase ASCII letter, each with any trailing
/// hyphens.
const CANONICAL_PATTERN: &str = r"^(?:[a-z][^-]*-*)+";

fn compile_regex(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("{context}: {error}"))
}

fn canonical_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| compile_regex(CANONICAL_PATTERN, "canonical name pattern should compile"))
}

/// Derive the canonical directory name for `dirname`.
///
/// Returns `None` when `dirname` does not start with a lowercase ASCII
/// letter; such directories keep their extracted name.
///
/// # Examples
///
/// ```
/// use toolfetch::canonical::canonical_name;
///
/// let name = canonical_name("xtensa-lx106-elf-gcc-1.22.0-103-gb8e7818-5.2.0");
/// assert_eq!(name.as_deref(), Some("xtensa-lx106-elf-gcc"));
/// ```
#[must_use]
pub fn canonical_name(dirname: &str) -> Option<String> {
    let matched = canonical_regex().find(dirname)?;
    let trimmed = matched.as_str().trim_end_matches('-');
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}
