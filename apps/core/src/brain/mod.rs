//! # Brain Module
//!
//! Rule-based conversation core for Solace. Every reply is chosen from
//! canned, reviewed text; nothing here generates free text.
//!
//! ## Components
//! - `normalizer`: canonical text form and light Arabic stemming
//! - `lexicon`: stem-indexed sentiment scoring (fallback path)
//! - `crisis`: self-harm keyword gate
//! - `topics`: generic and override topic detection
//! - `intent`: greeting and introduction intents
//! - `phrase_bank`: fuzzy lookup of canned answers
//! - `classifier`: learned-model adapter with lexicon fallback
//! - `embedding_backend`: FastEmbed prototype classifier
//! - `composer`: the reply cascade
//! - `insight`: worry reframing
//! - `turn_packet`: output data structures
//! - `analyzer`: the `SupportEngine` façade

pub mod analyzer;
pub mod classifier;
pub mod composer;
pub mod crisis;
pub mod embedding_backend;
pub mod insight;
pub mod intent;
pub mod lexicon;
pub mod normalizer;
pub mod phrase_bank;
pub mod topics;
pub mod turn_packet;

// Re-export main types for convenience
pub use analyzer::SupportEngine;
pub use classifier::{ClassifierAdapter, ClassifierBackend, ClassifierSlot};
pub use composer::{EmotionBucket, ResponseComposer};
pub use crisis::{CrisisGate, RiskLevel};
pub use insight::InsightGenerator;
pub use lexicon::LexiconSentimentModel;
pub use turn_packet::{Analysis, Composition, TurnPacket};
