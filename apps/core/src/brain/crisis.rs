//! Crisis gate: unconditional self-harm risk detection.
//!
//! Any keyword hit, in any case, marks the utterance HIGH. A HIGH result
//! short-circuits every other branch of reply composition.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::normalizer::normalize;

/// The fixed reply for HIGH-risk turns.
pub const CRISIS_REPLY: &str =
    "إذا كنت تفكر في إيذاء نفسك، اتصل بالأرقام الطارئة أو بخط الدعم فوراً. حياتك غالية ومهمة.";

/// Always active, whatever the loaded bundle says.
const CRISIS_FLOOR: &[&str] = &[
    "انتحر",
    "أريد أن أنتحر",
    "أُنهِي حياتي",
    "قتل نفسي",
    "suicide",
    "end my life",
    "موت",
    "اموت",
];

/// Risk classification of one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn is_high(&self) -> bool {
        matches!(self, RiskLevel::High)
    }

    /// User-facing description.
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::High => "خطورة عالية - يرجى طلب المساعدة",
            RiskLevel::Low => "خطورة منخفضة",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Low => write!(f, "LOW"),
        }
    }
}

/// Substring detector over crisis keywords.
///
/// Each keyword is kept twice: lowercased as written, and normalized. The raw
/// text is tested against the first form and its normalized text against the
/// second, so diacritics or punctuation on either side cannot hide a hit.
#[derive(Debug, Clone)]
pub struct CrisisGate {
    raw: Vec<String>,
    normalized: Vec<String>,
}

impl Default for CrisisGate {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl CrisisGate {
    /// Builds the gate from configured keywords merged with the built-in floor.
    pub fn new(keywords: &[String]) -> Self {
        let mut raw: Vec<String> = Vec::new();
        let mut normalized: Vec<String> = Vec::new();

        let all = CRISIS_FLOOR
            .iter()
            .map(|s| s.to_string())
            .chain(keywords.iter().cloned());

        for keyword in all {
            let lowered = keyword.to_lowercase();
            if !lowered.trim().is_empty() && !raw.contains(&lowered) {
                raw.push(lowered);
            }
            let norm = normalize(&keyword);
            if !norm.is_empty() && !normalized.contains(&norm) {
                normalized.push(norm);
            }
        }

        Self { raw, normalized }
    }

    /// HIGH on any keyword hit, LOW otherwise.
    pub fn check(&self, text: &str) -> RiskLevel {
        if self.match_count(text) > 0 {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    /// Keyword hits across both forms.
    pub fn match_count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let lowered = text.to_lowercase();
        let norm = normalize(text);

        let raw_hits = self
            .raw
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .count();
        let norm_hits = self
            .normalized
            .iter()
            .filter(|k| norm.contains(k.as_str()))
            .count();
        raw_hits + norm_hits
    }

    pub fn keyword_count(&self) -> usize {
        self.raw.len()
    }
}
