//! Start-up data bundle.
//!
//! The bundle is plain serde data read once before serving. [`EngineData`] is
//! the prepared, immutable form every component shares through an `Arc`.
//! Any collection may be missing; it then deserializes empty and the
//! component that reads it falls back to its documented default.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use crate::brain::composer::EmotionBucket;
use crate::brain::crisis::CrisisGate;
use crate::brain::insight::InsightGenerator;
use crate::brain::intent::{GreetingMatcher, IntroResponder};
use crate::brain::lexicon::StemIndex;
use crate::brain::phrase_bank::PhraseBank;
use crate::brain::topics::TopicMatcher;
use crate::error::AppError;
use crate::models::EngineConfig;

/// Default bundle compiled into the binary.
const BUILTIN_BUNDLE: &str = include_str!("../data/bundle.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LexiconEntry {
    pub word: String,
    /// Clamped to [-1.0, 1.0] when indexed.
    pub polarity: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicEntry {
    pub id: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Canned paragraphs; only generic topics carry them.
    #[serde(default)]
    pub responses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GreetingEntry {
    pub trigger: String,
    pub reply: String,
}

/// Reply pools for the four introduction intents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroPools {
    #[serde(rename = "self")]
    pub identity: Vec<String>,
    pub capabilities: Vec<String>,
    pub trust: Vec<String>,
    pub general_chat: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhraseBankEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionPools {
    pub validation: Vec<String>,
    pub questions: Vec<String>,
}

/// Per-bucket validation and question pools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmotionTemplates {
    pub happy: EmotionPools,
    pub sad: EmotionPools,
    pub angry: EmotionPools,
    pub anxious: EmotionPools,
    pub lonely: EmotionPools,
    pub tired: EmotionPools,
    pub neutral: EmotionPools,
}

impl EmotionTemplates {
    /// Pools for a bucket; a bucket with no lines at all borrows the neutral
    /// pools.
    pub fn get(&self, bucket: EmotionBucket) -> &EmotionPools {
        let pools = self.own(bucket);
        if pools.validation.is_empty() && pools.questions.is_empty() {
            &self.neutral
        } else {
            pools
        }
    }

    /// Buckets carrying their own validation lines.
    pub fn populated_buckets(&self) -> usize {
        EmotionBucket::ALL
            .iter()
            .filter(|b| !self.own(**b).validation.is_empty())
            .count()
    }

    fn own(&self, bucket: EmotionBucket) -> &EmotionPools {
        match bucket {
            EmotionBucket::Happy => &self.happy,
            EmotionBucket::Sad => &self.sad,
            EmotionBucket::Angry => &self.angry,
            EmotionBucket::Anxious => &self.anxious,
            EmotionBucket::Lonely => &self.lonely,
            EmotionBucket::Tired => &self.tired,
            EmotionBucket::Neutral => &self.neutral,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InterventionPools {
    pub grounding: Vec<String>,
    pub reframing: Vec<String>,
}

/// One worry theme for the insight generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightTheme {
    pub theme: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub insight: String,
}

/// Everything the engine reads at start-up.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartupDataBundle {
    /// Ordered; the first word sharing a stem names the emotion.
    pub lexicon: Vec<LexiconEntry>,
    /// Generic topics in detection order.
    pub topics: Vec<TopicEntry>,
    /// Override topics in detection order.
    pub override_topics: Vec<TopicEntry>,
    pub crisis_keywords: Vec<String>,
    pub greetings: Vec<GreetingEntry>,
    pub intro: IntroPools,
    pub phrase_bank: Vec<PhraseBankEntry>,
    pub emotions: EmotionTemplates,
    pub interventions: InterventionPools,
    /// Themes in precedence order.
    pub insight_themes: Vec<InsightTheme>,
    pub wisdom: Vec<String>,
    pub motivational_quotes: Vec<String>,
}

impl StartupDataBundle {
    /// The compiled-in bundle. A parse failure degrades to the empty bundle.
    pub fn builtin() -> Self {
        match Self::from_json_str(BUILTIN_BUNDLE) {
            Ok(bundle) => bundle,
            Err(e) => {
                error!("Built-in bundle is malformed, serving with empty data: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads a bundle from a JSON file.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = fs::read_to_string(path)?;
        let bundle = Self::from_json_str(&raw)?;
        info!(
            path = %path.display(),
            lexicon = bundle.lexicon.len(),
            topics = bundle.topics.len(),
            "Loaded start-up bundle"
        );
        Ok(bundle)
    }

    /// Reads the bundle at `path`, or the built-in one when the file is
    /// missing or unreadable.
    pub fn load_or_builtin(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "No external bundle, using built-in data");
            return Self::builtin();
        }
        match Self::load(path) {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(path = %path.display(), "Failed to load bundle, using built-in data: {}", e);
                Self::builtin()
            }
        }
    }
}

/// Prepared start-up data, shared read-only by every component.
#[derive(Debug, Clone)]
pub struct EngineData {
    pub stems: StemIndex,
    pub topics: TopicMatcher,
    pub crisis: CrisisGate,
    pub greetings: GreetingMatcher,
    pub intro: IntroResponder,
    pub phrase_bank: PhraseBank,
    pub emotions: EmotionTemplates,
    pub interventions: InterventionPools,
    pub insight: InsightGenerator,
    pub quotes: Vec<String>,
}

impl EngineData {
    pub fn from_bundle(bundle: &StartupDataBundle, config: &EngineConfig) -> Self {
        let data = Self {
            stems: StemIndex::build(&bundle.lexicon),
            topics: TopicMatcher::new(&bundle.topics, &bundle.override_topics),
            crisis: CrisisGate::new(&bundle.crisis_keywords),
            greetings: GreetingMatcher::new(&bundle.greetings),
            intro: IntroResponder::new(bundle.intro.clone()),
            phrase_bank: PhraseBank::new(&bundle.phrase_bank, config.phrase_match_cutoff),
            emotions: bundle.emotions.clone(),
            interventions: bundle.interventions.clone(),
            insight: InsightGenerator::new(&bundle.insight_themes, &bundle.wisdom),
            quotes: bundle.motivational_quotes.clone(),
        };

        if data.emotions.populated_buckets() == 0 {
            warn!("No emotion validation pools loaded; replies fall back to the generic sentence");
        }
        data
    }
}

/// Uniform draw from a template pool.
pub(crate) fn draw<'a, R: Rng + ?Sized>(pool: &'a [String], rng: &mut R) -> Option<&'a str> {
    pool.choose(rng).map(|s| s.as_str())
}
