//! Text normalization and light Arabic stemming.
//!
//! Every matcher in the brain works on the canonical form produced here.

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Arabic harakat, Quranic annotation marks and tatweel.
static DIACRITICS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{0610}-\u{061A}\u{064B}-\u{065F}\u{06D6}-\u{06ED}\u{0640}]")
        .expect("Invalid regex: Arabic diacritics")
});

/// Any run that is neither a word character nor in the Arabic block.
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\u{0600}-\u{06FF}]+").expect("Invalid regex: separator runs")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex: whitespace runs"));

/// Tried in order; at most one is removed.
const PREFIXES: &[&str] = &["ال", "و", "ف", "ب", "ل", "ك"];

/// Tried in order; at most one is removed.
const SUFFIXES: &[&str] = &["ه", "ها", "ان", "ون", "ين", "ات", "ة"];

/// Canonicalizes raw text: NFKC, diacritics stripped, lowercased, separators
/// collapsed to single spaces, trimmed. Empty input yields an empty string.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let canonical: String = text.nfkc().collect();
    let stripped = DIACRITICS.replace_all(&canonical, "");
    let lowered = stripped.to_lowercase();
    let spaced = SEPARATORS.replace_all(&lowered, " ");
    WHITESPACE.replace_all(&spaced, " ").trim().to_string()
}

/// Removes at most one prefix and then at most one suffix. An affix is only
/// removed when at least two characters remain.
pub fn stem(word: &str) -> String {
    let mut current = word;

    for prefix in PREFIXES {
        if let Some(rest) = current.strip_prefix(prefix) {
            if rest.chars().count() >= 2 {
                current = rest;
                break;
            }
        }
    }

    for suffix in SUFFIXES {
        if let Some(rest) = current.strip_suffix(suffix) {
            if rest.chars().count() >= 2 {
                current = rest;
                break;
            }
        }
    }

    current.to_string()
}

/// Normalizes and splits on single spaces.
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string())
        .collect()
}
