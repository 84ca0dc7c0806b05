//! Turn Packet - output structures of the engine.
//!
//! `Analysis` and `Composition` are the results of the two halves of a turn;
//! `TurnPacket` is what one full chat turn hands back to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::crisis::RiskLevel;

/// Shown alongside every reply.
pub const APP_DISCLAIMER: &str = "ملاحظة: هذا التطبيق ليس بديلاً عن العلاج النفسي المحترف. إذا كنت تفكر في إيذاء نفسك، \
اتصل بالأرقام الطارئة أو بخط الدعم النفسي المحلي فوراً. يمكنني تقديم دعم لحظي وإجراءات تهدئة قصيرة.";

/// Result of sentiment and risk analysis for one utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Emotion label, override topic id, or the neutral label
    pub label: String,
    /// Class probabilities; present only when the learned model answered
    pub scores: Option<Vec<f32>>,
    pub risk: RiskLevel,
}

impl Analysis {
    pub fn from_model(&self) -> bool {
        self.scores.is_some()
    }
}

/// Reply chosen by the composer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub reply: String,
    /// Always set: "crisis", "greeting", "intro", "general" or a topic id
    pub tag: String,
    /// Genuine topic to thread into the next turn
    pub active_topic: Option<String>,
}

impl Composition {
    /// The single token a caller can store as its next active topic.
    pub fn new_active_topic(&self) -> &str {
        &self.tag
    }
}

/// Complete result of one chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnPacket {
    pub turn_id: Uuid,

    pub reply: String,

    /// Sentiment label from the analysis
    pub label: String,

    /// Model probabilities (if the learned model answered)
    pub scores: Option<Vec<f32>>,

    pub risk: RiskLevel,

    /// Cascade tag of the reply
    pub tag: String,

    /// Topic to pass back on the next turn
    pub active_topic: Option<String>,

    pub disclaimer: String,

    /// Processing time in milliseconds
    pub processing_time_ms: u64,

    pub timestamp: DateTime<Utc>,
}

impl TurnPacket {
    pub fn new(analysis: Analysis, composition: Composition) -> Self {
        Self {
            turn_id: Uuid::new_v4(),
            reply: composition.reply,
            label: analysis.label,
            scores: analysis.scores,
            risk: analysis.risk,
            tag: composition.tag,
            active_topic: composition.active_topic,
            disclaimer: APP_DISCLAIMER.to_string(),
            processing_time_ms: 0,
            timestamp: Utc::now(),
        }
    }

    pub fn is_crisis(&self) -> bool {
        self.risk.is_high()
    }

    /// Get a summary for logging (never includes the reply text)
    pub fn summary(&self) -> String {
        format!(
            "Risk: {}, Tag: {}, Topic: {}, Model: {}, {}ms",
            self.risk,
            self.tag,
            self.active_topic.as_deref().unwrap_or("-"),
            if self.scores.is_some() { "yes" } else { "no" },
            self.processing_time_ms
        )
    }
}
