//! Filesystem-safe slugs for cache file names.
//!
//! Each root directory gets its own sidecar file, named after a slug of the
//! root path. Non-ASCII characters are transliterated through NFKD
//! decomposition (`é` becomes `e`); anything that has no ASCII base is dropped.

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[–—/:;,.]").expect("valid separator regex"));

static DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9 -]").expect("valid disallowed regex"));

static HYPHEN_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("-+").expect("valid hyphen regex"));

/// Convert a string into a lowercase ASCII slug.
///
/// ```
/// use rustgallery::cache::slugify;
///
/// assert_eq!(slugify("/home/alex/Photos"), "-home-alex-photos");
/// assert_eq!(slugify("Été 2024"), "ete-2024");
/// ```
#[must_use]
pub fn slugify(s: &str) -> String {
    let separated = SEPARATORS.replace_all(s, "-");
    let ascii: String = separated.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    let cleaned = DISALLOWED.replace_all(&lowered, "");
    let hyphenated = cleaned.replace(' ', "-");
    HYPHEN_RUNS.replace_all(&hyphenated, "-").into_owned()
}
