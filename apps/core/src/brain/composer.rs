//! Response composer.
//!
//! A fixed cascade, first applicable rule wins:
//!
//! 0. HIGH risk: the crisis sentence
//! 1. continuation of the active topic
//! 2. greeting
//! 3. introduction question
//! 4. phrase-bank answer
//! 5. synthesis from emotion, topic and intervention pools
//!
//! Empty normalized text that gets past rules 0 and 1 ends in
//! [`FALLBACK_REPLY`]. All randomness comes from the caller's RNG.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use super::crisis::{RiskLevel, CRISIS_REPLY};
use super::normalizer::normalize;
use super::turn_packet::Composition;
use crate::bundle::{draw, EngineData};
use crate::models::EngineConfig;

/// Reply for input that is empty once normalized.
pub const FALLBACK_REPLY: &str = "يرجى إدخال رسالة.";

/// Validation used when the bucket has no pool.
pub const GENERIC_VALIDATION: &str = "أسمعك بوضوح.";

pub const TAG_CRISIS: &str = "crisis";
pub const TAG_GREETING: &str = "greeting";
pub const TAG_INTRO: &str = "intro";
pub const TAG_GENERAL: &str = "general";

/// Coarse emotion category selecting the template pools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionBucket {
    Happy,
    Sad,
    Angry,
    Anxious,
    Lonely,
    Tired,
    Neutral,
}

impl fmt::Display for EmotionBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl EmotionBucket {
    pub const ALL: [EmotionBucket; 7] = [
        EmotionBucket::Happy,
        EmotionBucket::Sad,
        EmotionBucket::Angry,
        EmotionBucket::Anxious,
        EmotionBucket::Lonely,
        EmotionBucket::Tired,
        EmotionBucket::Neutral,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            EmotionBucket::Happy => "happy",
            EmotionBucket::Sad => "sad",
            EmotionBucket::Angry => "angry",
            EmotionBucket::Anxious => "anxious",
            EmotionBucket::Lonely => "lonely",
            EmotionBucket::Tired => "tired",
            EmotionBucket::Neutral => "neutral",
        }
    }

    fn synonyms(&self) -> &'static [&'static str] {
        match self {
            EmotionBucket::Happy => &[
                "سعيد", "مبسوط", "فرحان", "متفائل", "رائع", "ممتاز", "جميل", "مذهل", "سعيدة",
                "مبسوطة", "فرحانة",
            ],
            EmotionBucket::Sad => &[
                "حزين", "مكتئب", "متضايق", "محبط", "يأس", "سيء", "فاشل", "مشكلة", "صعب", "حزن",
                "حزينة", "مكتئبة", "متضايقة", "وحيدة",
            ],
            EmotionBucket::Angry => &["غاضب", "عصبي", "مستفز", "غاضبة", "عصبية"],
            EmotionBucket::Anxious => &["قلق", "متوتر", "خايف", "خائف", "قلقة", "متوترة", "خائفة"],
            EmotionBucket::Lonely => &["وحدة", "وحيد"],
            EmotionBucket::Tired => &["تعبان", "مرهق"],
            EmotionBucket::Neutral => &[],
        }
    }

    /// First bucket, in fixed order, with a synonym contained in the label.
    pub fn from_label(label: &str) -> Self {
        let lowered = label.to_lowercase();
        EmotionBucket::ALL
            .into_iter()
            .find(|bucket| bucket.synonyms().iter().any(|s| lowered.contains(s)))
            .unwrap_or(EmotionBucket::Neutral)
    }

    /// Buckets eligible for a grounding exercise.
    pub fn wants_grounding(&self) -> bool {
        matches!(
            self,
            EmotionBucket::Anxious | EmotionBucket::Sad | EmotionBucket::Angry
        )
    }
}

#[derive(Debug, Clone)]
pub struct ResponseComposer {
    data: Arc<EngineData>,
    long_message_words: usize,
    grounding_probability: f32,
    reframing_probability: f32,
    long_question_probability: f32,
}

impl ResponseComposer {
    pub fn new(data: Arc<EngineData>, config: &EngineConfig) -> Self {
        Self {
            data,
            long_message_words: config.long_message_words,
            grounding_probability: config.grounding_probability,
            reframing_probability: config.reframing_probability,
            long_question_probability: config.long_question_probability,
        }
    }

    pub fn compose<R: Rng + ?Sized>(
        &self,
        label: &str,
        risk: RiskLevel,
        text: &str,
        active_topic: Option<&str>,
        rng: &mut R,
    ) -> Composition {
        let active_topic = active_topic.filter(|t| !t.trim().is_empty());
        let carried = active_topic.map(str::to_string);

        if risk.is_high() {
            return Self::fixed(CRISIS_REPLY, TAG_CRISIS, carried);
        }

        if let Some(topic) = active_topic {
            if self.data.topics.detect_continuation_intent(text) {
                if let Some(reply) = self.data.topics.topic_pool(topic).and_then(|p| draw(p, rng)) {
                    debug!(topic, "Continuing active topic");
                    return Self::fixed(reply, topic, carried);
                }
            }
        }

        let norm = normalize(text);
        if norm.is_empty() {
            return Self::fixed(FALLBACK_REPLY, TAG_GENERAL, carried);
        }

        if let Some(reply) = self.data.greetings.match_reply(&norm) {
            return Self::fixed(reply, TAG_GREETING, carried);
        }

        if let Some(intent) = self.data.intro.detect(text) {
            debug!(%intent, "Introduction question");
            let reply = self.data.intro.reply(intent, rng);
            return Self::fixed(&reply, TAG_INTRO, carried);
        }

        if let Some(answer) = self.data.phrase_bank.match_answer(&norm) {
            return Self::fixed(answer, TAG_GENERAL, carried);
        }

        self.synthesize(label, text, active_topic, rng)
    }

    fn synthesize<R: Rng + ?Sized>(
        &self,
        label: &str,
        text: &str,
        active_topic: Option<&str>,
        rng: &mut R,
    ) -> Composition {
        let bucket = EmotionBucket::from_label(label);
        let detected = self.data.topics.detect_generic_topic(text);
        let is_long = text.split_whitespace().count() > self.long_message_words;
        let pools = self.data.emotions.get(bucket);

        let mut parts: Vec<&str> = Vec::with_capacity(3);
        parts.push(draw(&pools.validation, rng).unwrap_or(GENERIC_VALIDATION));

        if let Some(paragraph) = detected
            .and_then(|topic| self.data.topics.topic_pool(topic))
            .and_then(|pool| draw(pool, rng))
        {
            parts.push(paragraph);
        }

        let interventions = &self.data.interventions;
        let intervention = if bucket.wants_grounding() && rng.gen::<f32>() < self.grounding_probability
        {
            draw(&interventions.grounding, rng)
        } else if rng.gen::<f32>() < self.reframing_probability {
            draw(&interventions.reframing, rng)
        } else {
            None
        };

        match intervention {
            Some(line) => parts.push(line),
            None => {
                if !is_long || rng.gen::<f32>() < self.long_question_probability {
                    if let Some(question) = draw(&pools.questions, rng) {
                        parts.push(question);
                    }
                }
            }
        }

        let topic = detected.or(active_topic);
        debug!(%bucket, topic = topic.unwrap_or(TAG_GENERAL), parts = parts.len(), "Synthesized reply");

        Composition {
            reply: parts.join(" "),
            tag: topic.unwrap_or(TAG_GENERAL).to_string(),
            active_topic: topic.map(str::to_string),
        }
    }

    fn fixed(reply: &str, tag: &str, active_topic: Option<String>) -> Composition {
        Composition {
            reply: reply.to_string(),
            tag: tag.to_string(),
            active_topic,
        }
    }
}
