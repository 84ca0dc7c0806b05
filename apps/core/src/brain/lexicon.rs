//! Lexicon sentiment scoring, the path used when no learned model answers.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::normalizer::{normalize, stem, tokenize};
use crate::bundle::{EngineData, LexiconEntry};

/// Label produced when nothing in the text carries sentiment.
pub const NEUTRAL_LABEL: &str = "محايد/أخرى";

/// A negation immediately before a matched word flips and scales it.
const NEGATIONS: &[&str] = &["لا", "ليس", "لم", "لن", "غير", "ما"];

const NEGATION_WEIGHT: f32 = -1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct StemEntry {
    pub polarity: f32,
    /// First lexicon word that reduces to this stem.
    pub word: String,
}

/// Stem -> polarity lookup, built once from the lexicon.
///
/// When several words share a stem the last polarity wins, while the
/// reported word stays the first one listed.
#[derive(Debug, Clone, Default)]
pub struct StemIndex {
    entries: HashMap<String, StemEntry>,
}

impl StemIndex {
    pub fn build(lexicon: &[LexiconEntry]) -> Self {
        let mut entries: HashMap<String, StemEntry> = HashMap::new();

        for entry in lexicon {
            let key = stem(&normalize(&entry.word));
            if key.is_empty() {
                continue;
            }
            let polarity = if entry.polarity.is_finite() {
                entry.polarity.clamp(-1.0, 1.0)
            } else {
                0.0
            };

            entries
                .entry(key)
                .and_modify(|e| e.polarity = polarity)
                .or_insert_with(|| StemEntry {
                    polarity,
                    word: entry.word.clone(),
                });
        }

        Self { entries }
    }

    pub fn lookup(&self, stemmed: &str) -> Option<&StemEntry> {
        self.entries.get(stemmed)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Full scoring result, kept for diagnostics and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconScore {
    pub label: String,
    pub score: f32,
    pub matches: usize,
    /// Lexicon words whose stems matched, in text order.
    pub detected_words: Vec<String>,
}

impl LexiconScore {
    fn labelled(label: &str) -> Self {
        Self {
            label: label.to_string(),
            score: 0.0,
            matches: 0,
            detected_words: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LexiconSentimentModel {
    data: Arc<EngineData>,
}

impl LexiconSentimentModel {
    pub fn new(data: Arc<EngineData>) -> Self {
        Self { data }
    }

    /// Label for `text`: an override topic id, the last matched lexicon
    /// word, or [`NEUTRAL_LABEL`].
    pub fn score(&self, text: &str) -> String {
        self.score_detailed(text).label
    }

    pub fn score_detailed(&self, text: &str) -> LexiconScore {
        if let Some(topic) = self.data.topics.detect_override_topic(text) {
            return LexiconScore::labelled(topic);
        }

        let tokens = tokenize(text);
        let mut result = LexiconScore::labelled(NEUTRAL_LABEL);

        for (i, token) in tokens.iter().enumerate() {
            let Some(entry) = self.data.stems.lookup(&stem(token)) else {
                continue;
            };
            if entry.polarity == 0.0 {
                continue;
            }

            let negated = i > 0 && NEGATIONS.contains(&tokens[i - 1].as_str());
            result.score += if negated {
                entry.polarity * NEGATION_WEIGHT
            } else {
                entry.polarity
            };
            result.matches += 1;
            result.detected_words.push(entry.word.clone());
        }

        // Most recent emotion word names the turn
        if let Some(last) = result.detected_words.last() {
            result.label = last.clone();
        }
        result
    }
}
