use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;
use validator::Validate;

/// Tunables for one engine instance. Fixed for the process lifetime once the
/// engine is constructed.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
#[serde(default)]
pub struct EngineConfig {
    /// How many prior turns (plus the current one) feed the learned classifier.
    #[validate(range(min = 1, max = 50))]
    pub context_turns: usize,
    /// Joins contextualized turns before encoding.
    #[validate(length(min = 1))]
    pub context_separator: String,
    /// Minimum similarity for a phrase-bank answer. Shared by every lookup.
    #[validate(range(min = 0.0, max = 1.0))]
    pub phrase_match_cutoff: f32,
    /// A message with more words than this counts as long.
    #[validate(range(min = 1))]
    pub long_message_words: usize,
    /// Chance of a grounding exercise for anxious, sad and angry buckets.
    #[validate(range(min = 0.0, max = 1.0))]
    pub grounding_probability: f32,
    /// Chance of a reframing prompt when grounding did not fire.
    #[validate(range(min = 0.0, max = 1.0))]
    pub reframing_probability: f32,
    /// Chance of still asking a question after a long message.
    #[validate(range(min = 0.0, max = 1.0))]
    pub long_question_probability: f32,
    /// Contextualized input is cut to this many characters, keeping the newest text.
    #[validate(range(min = 16))]
    pub max_model_input_chars: usize,
    /// Whether start-up should try to load the learned classifier at all.
    pub classifier_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            context_turns: 5,
            context_separator: " [SEP] ".to_string(),
            phrase_match_cutoff: 0.6,
            long_message_words: 7,
            grounding_probability: 0.2,
            reframing_probability: 0.1,
            long_question_probability: 0.3,
            max_model_input_chars: 512,
            classifier_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Builds the configuration from defaults, a `.env` file if present, and
    /// `SOLACE_*` environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenv::dotenv().ok();

        let mut config = Self::default();

        if let Some(v) = read_var("SOLACE_CONTEXT_TURNS")? {
            config.context_turns = v;
        }
        if let Ok(v) = env::var("SOLACE_CONTEXT_SEPARATOR") {
            config.context_separator = v;
        }
        if let Some(v) = read_var("SOLACE_PHRASE_MATCH_CUTOFF")? {
            config.phrase_match_cutoff = v;
        }
        if let Some(v) = read_var("SOLACE_LONG_MESSAGE_WORDS")? {
            config.long_message_words = v;
        }
        if let Some(v) = read_var("SOLACE_GROUNDING_PROBABILITY")? {
            config.grounding_probability = v;
        }
        if let Some(v) = read_var("SOLACE_REFRAMING_PROBABILITY")? {
            config.reframing_probability = v;
        }
        if let Some(v) = read_var("SOLACE_LONG_QUESTION_PROBABILITY")? {
            config.long_question_probability = v;
        }
        if let Some(v) = read_var("SOLACE_MAX_MODEL_INPUT_CHARS")? {
            config.max_model_input_chars = v;
        }
        if let Some(v) = read_var("SOLACE_CLASSIFIER_ENABLED")? {
            config.classifier_enabled = v;
        }

        config.validate()?;
        debug!(?config, "Engine configuration loaded");
        Ok(config)
    }
}

fn read_var<T>(key: &str) -> Result<Option<T>, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("{}={:?}: {}", key, raw, e))),
        Err(_) => Ok(None),
    }
}
