//! Topic detection by keyword substring.
//!
//! Two independent keyword sets are kept: the generic set decides which
//! canned paragraph joins a reply, the override set replaces the emotion
//! label outright. Both are scanned in their configured order and the first
//! hit wins.

use std::collections::HashMap;

use super::normalizer::normalize;
use crate::bundle::TopicEntry;

/// Phrases asking the assistant to keep going on the open thread.
const CONTINUATION_PHRASES: &[&str] = &[
    "تابع", "كمل", "بعدين", "اكمل", "المزيد", "استمر", "ثم", "وبعدين", "شنو بعد",
];

/// One topic id with its trigger substrings (lowercased, empties dropped).
#[derive(Debug, Clone)]
pub struct KeywordSet {
    pub id: String,
    pub keywords: Vec<String>,
}

impl KeywordSet {
    fn from_entry(entry: &TopicEntry) -> Self {
        Self {
            id: entry.id.clone(),
            keywords: entry
                .keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.trim().is_empty())
                .collect(),
        }
    }

    fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

/// Generic and override topic matching plus per-topic paragraph pools.
#[derive(Debug, Clone, Default)]
pub struct TopicMatcher {
    generic: Vec<KeywordSet>,
    overrides: Vec<KeywordSet>,
    paragraphs: HashMap<String, Vec<String>>,
}

impl TopicMatcher {
    pub fn new(generic: &[TopicEntry], overrides: &[TopicEntry]) -> Self {
        let paragraphs = generic
            .iter()
            .filter(|t| !t.responses.is_empty())
            .map(|t| (t.id.clone(), t.responses.clone()))
            .collect();

        Self {
            generic: generic.iter().map(KeywordSet::from_entry).collect(),
            overrides: overrides.iter().map(KeywordSet::from_entry).collect(),
            paragraphs,
        }
    }

    /// First generic topic whose keywords occur in the lowercased raw text.
    pub fn detect_generic_topic(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.generic
            .iter()
            .find(|set| set.matches(&lowered))
            .map(|set| set.id.as_str())
    }

    /// First override topic whose keywords occur in the lowercased raw text.
    pub fn detect_override_topic(&self, text: &str) -> Option<&str> {
        let lowered = text.to_lowercase();
        self.overrides
            .iter()
            .find(|set| set.matches(&lowered))
            .map(|set| set.id.as_str())
    }

    /// Whether the normalized text asks to continue the open thread.
    /// Only meaningful when the caller holds an active topic.
    pub fn detect_continuation_intent(&self, text: &str) -> bool {
        let norm = normalize(text);
        if norm.is_empty() {
            return false;
        }
        CONTINUATION_PHRASES.iter().any(|p| norm.contains(p))
    }

    /// Paragraph pool for a generic topic, if it has one.
    pub fn topic_pool(&self, topic: &str) -> Option<&[String]> {
        self.paragraphs
            .get(topic)
            .map(|pool| pool.as_slice())
            .filter(|pool| !pool.is_empty())
    }

    pub fn generic_count(&self) -> usize {
        self.generic.len()
    }

    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, keywords: &[&str], responses: &[&str]) -> TopicEntry {
        TopicEntry {
            id: id.to_string(),
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            responses: responses.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matcher() -> TopicMatcher {
        TopicMatcher::new(
            &[
                entry("study", &["exam", "school"], &["Exams pass."]),
                entry("work", &["boss", "exam board"], &["Work is hard."]),
            ],
            &[entry("work_stress", &["", "boss"], &[])],
        )
    }

    #[test]
    fn test_first_generic_topic_wins() {
        let m = matcher();
        // Both sets match "exam board"; "study" is scanned first
        assert_eq!(m.detect_generic_topic("The EXAM board called"), Some("study"));
        assert_eq!(m.detect_generic_topic("my boss"), Some("work"));
        assert_eq!(m.detect_generic_topic("nothing here"), None);
        assert_eq!(m.detect_generic_topic(""), None);
    }

    #[test]
    fn test_empty_keywords_never_match() {
        let m = matcher();
        assert_eq!(m.detect_override_topic("hello"), None);
        assert_eq!(m.detect_override_topic("Boss again"), Some("work_stress"));
    }

    #[test]
    fn test_continuation_intent() {
        let m = matcher();
        assert!(m.detect_continuation_intent("كمل"));
        assert!(m.detect_continuation_intent("طيب، وبعدين؟"));
        assert!(!m.detect_continuation_intent("شكراً"));
        assert!(!m.detect_continuation_intent(""));
    }

    #[test]
    fn test_topic_pool() {
        let m = matcher();
        assert_eq!(m.topic_pool("study").map(|p| p.len()), Some(1));
        assert!(m.topic_pool("work_stress").is_none());
        assert!(m.topic_pool("general").is_none());
    }
}
