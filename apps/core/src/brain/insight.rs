//! Reframing insights for a stated worry.

use rand::Rng;

use crate::bundle::{draw, InsightTheme};

/// Returned when neither a theme nor the wisdom pool answers.
pub const FALLBACK_INSIGHT: &str = "أنت لست ما حدث لك، أنت ما تختار أن تكونه بعد ما حدث.";

#[derive(Debug, Clone)]
struct ThemeRule {
    theme: String,
    keywords: Vec<String>,
    insight: String,
}

/// Ordered theme rules plus a generic wisdom pool.
#[derive(Debug, Clone, Default)]
pub struct InsightGenerator {
    rules: Vec<ThemeRule>,
    wisdom: Vec<String>,
}

impl InsightGenerator {
    pub fn new(themes: &[InsightTheme], wisdom: &[String]) -> Self {
        let rules = themes
            .iter()
            .map(|t| ThemeRule {
                theme: t.theme.clone(),
                keywords: t
                    .keywords
                    .iter()
                    .map(|k| k.to_lowercase())
                    .filter(|k| !k.trim().is_empty())
                    .collect(),
                insight: t.insight.clone(),
            })
            .filter(|r| !r.keywords.is_empty())
            .collect();

        Self {
            rules,
            wisdom: wisdom.to_vec(),
        }
    }

    /// First theme, in configured order, with a keyword in the lowercased text.
    pub fn theme_for(&self, worry: &str) -> Option<&str> {
        self.matching_rule(worry).map(|r| r.theme.as_str())
    }

    /// The matched theme's sentence, else a random wisdom line.
    pub fn generate<R: Rng + ?Sized>(&self, worry: &str, rng: &mut R) -> String {
        if let Some(rule) = self.matching_rule(worry) {
            return rule.insight.clone();
        }
        draw(&self.wisdom, rng)
            .unwrap_or(FALLBACK_INSIGHT)
            .to_string()
    }

    pub fn theme_count(&self) -> usize {
        self.rules.len()
    }

    fn matching_rule(&self, worry: &str) -> Option<&ThemeRule> {
        let lowered = worry.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.keywords.iter().any(|k| lowered.contains(k.as_str())))
    }
}
