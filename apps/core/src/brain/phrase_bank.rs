//! Fuzzy lookup of canned answers.
//!
//! Similarity is the Ratcliff/Obershelp ratio `2*M / (|a| + |b|)` over
//! characters, where `M` counts characters in recursively found longest
//! common blocks.

use tracing::debug;

use super::normalizer::normalize;
use crate::bundle::PhraseBankEntry;

/// Similarity in [0.0, 1.0]; two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f32 / total as f32
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, size) = longest_common_block(a, b);
    if size == 0 {
        return 0;
    }
    size + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + size..], &b[j + size..])
}

/// Longest common substring as (start in a, start in b, length); the
/// earliest block wins ties.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut prev = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        let mut row = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let run = prev[j] + 1;
                row[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        prev = row;
    }
    best
}

/// Question/answer pairs keyed by normalized question.
#[derive(Debug, Clone)]
pub struct PhraseBank {
    entries: Vec<(String, String)>,
    cutoff: f32,
}

impl PhraseBank {
    pub fn new(entries: &[PhraseBankEntry], cutoff: f32) -> Self {
        let entries = entries
            .iter()
            .filter_map(|e| {
                let key = normalize(&e.question);
                (!key.is_empty()).then(|| (key, e.answer.clone()))
            })
            .collect();
        Self { entries, cutoff }
    }

    /// Answer for the closest key at or above the cutoff. Equal scores keep
    /// the earlier key.
    pub fn match_answer(&self, normalized: &str) -> Option<&str> {
        if normalized.is_empty() {
            return None;
        }

        let mut best: Option<(f32, &str)> = None;
        for (key, answer) in &self.entries {
            let ratio = similarity_ratio(normalized, key);
            if best.map_or(true, |(score, _)| ratio > score) {
                best = Some((ratio, answer.as_str()));
            }
        }

        let (score, answer) = best?;
        if score >= self.cutoff {
            debug!(score, "Phrase bank hit");
            Some(answer)
        } else {
            None
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
