//! Claim normalization for cache keys.
//!
//! Semantically identical claims must map to the same cache entry, so the
//! key is the claim folded to ASCII, lowercased, stripped of punctuation
//! (hyphens survive to keep compound terms intact), with whitespace
//! collapsed.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn punctuation() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s-]").expect("punctuation pattern is valid"))
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"))
}

/// Normalize a claim for use as a cache key.
///
/// # Examples
///
/// ```
/// use verity::claim::normalize_claim;
///
/// assert_eq!(
///     normalize_claim("Does Creatine Improve Muscle-Strength??"),
///     "does creatine improve muscle-strength"
/// );
/// ```
pub fn normalize_claim(claim: &str) -> String {
    // NFKD decomposition, then drop anything outside ASCII. This folds
    // accented characters onto their base letters before the filter.
    let folded: String = claim.nfkd().filter(char::is_ascii).collect();

    let lower = folded.to_lowercase();
    let stripped = punctuation().replace_all(&lower, "");
    let collapsed = whitespace().replace_all(&stripped, " ");

    collapsed.trim().to_string()
}
