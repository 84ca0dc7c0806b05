//! Classifier adapter: learned model when present, lexicon otherwise.
//!
//! The backend is probed once at start-up and fixed for the process
//! lifetime. A failing call is demoted to the lexicon path for that call
//! only; nothing here returns an error to the caller.

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::embedding_backend::EmbeddingPrototypeBackend;
use super::lexicon::{LexiconSentimentModel, NEUTRAL_LABEL};
use super::normalizer::normalize;
use super::turn_packet::Analysis;
use crate::bundle::EngineData;
use crate::error::AppError;
use crate::fs_manager::PortablePathManager;
use crate::models::EngineConfig;

/// Class index -> label for the learned model.
pub const MODEL_LABELS: [&str; 5] = ["حزين", "قلق", NEUTRAL_LABEL, NEUTRAL_LABEL, NEUTRAL_LABEL];

/// Label for a class index; indices outside the table are neutral.
pub fn label_for_class(index: usize) -> &'static str {
    MODEL_LABELS.get(index).copied().unwrap_or(NEUTRAL_LABEL)
}

/// A learned sentiment model.
pub trait ClassifierBackend: Send + Sync {
    /// Raw scores over the fixed label set for contextualized text.
    fn infer(&self, text: &str) -> Result<Vec<f32>, AppError>;

    /// Expected length of every `infer` output.
    fn label_count(&self) -> usize;

    fn name(&self) -> &str {
        "classifier"
    }
}

/// Whether a learned backend is available to this process.
#[derive(Clone, Default)]
pub enum ClassifierSlot {
    #[default]
    Absent,
    Loaded(Arc<dyn ClassifierBackend>),
}

impl fmt::Debug for ClassifierSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierSlot::Absent => write!(f, "Absent"),
            ClassifierSlot::Loaded(backend) => write!(f, "Loaded({})", backend.name()),
        }
    }
}

impl ClassifierSlot {
    /// Tries to bring up the shipped embedding backend. Any failure leaves the
    /// slot `Absent`; start-up continues either way.
    pub fn probe(config: &EngineConfig) -> Self {
        if !config.classifier_enabled {
            info!("Learned classifier disabled by configuration");
            return ClassifierSlot::Absent;
        }

        let cache_dir = PortablePathManager::models_dir().join("embeddings");
        match EmbeddingPrototypeBackend::try_new(cache_dir) {
            Ok(backend) => {
                info!(labels = backend.label_count(), "Learned classifier loaded");
                ClassifierSlot::Loaded(Arc::new(backend))
            }
            Err(e) => {
                warn!("Learned classifier unavailable, using lexicon path: {}", e);
                ClassifierSlot::Absent
            }
        }
    }

    pub fn loaded<B: ClassifierBackend + 'static>(backend: B) -> Self {
        ClassifierSlot::Loaded(Arc::new(backend))
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ClassifierSlot::Loaded(_))
    }

    pub fn backend_name(&self) -> Option<&str> {
        match self {
            ClassifierSlot::Absent => None,
            ClassifierSlot::Loaded(backend) => Some(backend.name()),
        }
    }
}

/// Numerically stable softmax.
pub(crate) fn softmax(raw: &[f32]) -> Vec<f32> {
    let max = raw.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = raw.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the first one on ties.
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

/// Keeps the last `max_chars` characters.
fn keep_newest(text: &str, max_chars: usize) -> &str {
    let count = text.chars().count();
    if count <= max_chars {
        return text;
    }
    match text.char_indices().nth(count - max_chars) {
        Some((offset, _)) => &text[offset..],
        None => text,
    }
}

/// Produces `(label, scores, risk)` for an utterance and its history.
#[derive(Debug, Clone)]
pub struct ClassifierAdapter {
    data: Arc<EngineData>,
    lexicon: LexiconSentimentModel,
    slot: ClassifierSlot,
    context_turns: usize,
    separator: String,
    max_input_chars: usize,
}

impl ClassifierAdapter {
    pub fn new(data: Arc<EngineData>, config: &EngineConfig, slot: ClassifierSlot) -> Self {
        Self {
            lexicon: LexiconSentimentModel::new(data.clone()),
            data,
            slot,
            context_turns: config.context_turns,
            separator: config.context_separator.clone(),
            max_input_chars: config.max_model_input_chars,
        }
    }

    pub fn slot(&self) -> &ClassifierSlot {
        &self.slot
    }

    pub fn analyze(&self, text: &str, context: &[String]) -> Analysis {
        let risk = self.data.crisis.check(text);
        if risk.is_high() {
            warn!(
                matches = self.data.crisis.match_count(text),
                "Crisis keywords detected"
            );
        }

        let (label, scores) = match &self.slot {
            ClassifierSlot::Absent => (self.lexicon.score(text), None),
            ClassifierSlot::Loaded(backend) => {
                match self.model_label(backend.as_ref(), text, context) {
                    Ok((label, scores)) => (label, Some(scores)),
                    Err(e) => {
                        warn!("Classifier call failed, demoted to lexicon path: {}", e);
                        (self.lexicon.score(text), None)
                    }
                }
            }
        };

        Analysis { label, scores, risk }
    }

    /// Normalized history plus the utterance, last K turns, joined and cut
    /// to the model input size.
    pub fn contextualize(&self, text: &str, context: &[String]) -> String {
        let mut turns: Vec<String> = context.iter().map(|turn| normalize(turn)).collect();
        turns.push(normalize(text));

        let start = turns.len().saturating_sub(self.context_turns);
        let joined = turns[start..].join(&self.separator);
        keep_newest(&joined, self.max_input_chars).to_string()
    }

    fn model_label(
        &self,
        backend: &dyn ClassifierBackend,
        text: &str,
        context: &[String],
    ) -> Result<(String, Vec<f32>), AppError> {
        let input = self.contextualize(text, context);
        // Native runtimes can panic; that must not cross the serving boundary
        let raw = catch_unwind(AssertUnwindSafe(|| backend.infer(&input)))
            .map_err(|_| AppError::Inference("backend panicked".to_string()))??;

        let expected = backend.label_count();
        if raw.is_empty() || raw.len() != expected {
            return Err(AppError::Inference(format!(
                "expected {} scores, got {}",
                expected,
                raw.len()
            )));
        }
        if raw.iter().any(|v| !v.is_finite()) {
            return Err(AppError::Inference("non-finite score".to_string()));
        }

        let probabilities = softmax(&raw);
        let class = argmax(&probabilities);
        debug!(class, "Model prediction");

        let label = match self.data.topics.detect_override_topic(text) {
            Some(topic) => topic.to_string(),
            None => label_for_class(class).to_string(),
        };
        Ok((label, probabilities))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::crisis::RiskLevel;
    use crate::bundle::StartupDataBundle;
    use std::sync::Mutex;

    struct FixedBackend(Vec<f32>);

    impl ClassifierBackend for FixedBackend {
        fn infer(&self, _text: &str) -> Result<Vec<f32>, AppError> {
            Ok(self.0.clone())
        }
        fn label_count(&self) -> usize {
            5
        }
    }

    /// Records the text it was asked to classify.
    struct RecordingBackend(Mutex<Vec<String>>);

    impl ClassifierBackend for RecordingBackend {
        fn infer(&self, text: &str) -> Result<Vec<f32>, AppError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(vec![0.0; 5])
        }
        fn label_count(&self) -> usize {
            5
        }
    }

    fn adapter(slot: ClassifierSlot, config: &EngineConfig) -> ClassifierAdapter {
        let data = EngineData::from_bundle(&StartupDataBundle::builtin(), config);
        ClassifierAdapter::new(Arc::new(data), config, slot)
    }

    #[test]
    fn test_label_table() {
        assert_eq!(label_for_class(0), "حزين");
        assert_eq!(label_for_class(1), "قلق");
        assert_eq!(label_for_class(4), NEUTRAL_LABEL);
        assert_eq!(label_for_class(99), NEUTRAL_LABEL);
    }

    #[test]
    fn test_softmax_and_argmax() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert_eq!(argmax(&p), 2);
        assert_eq!(argmax(&[0.5, 0.5]), 0);
        // Large inputs stay finite
        assert!(softmax(&[1000.0, 1000.0]).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_absent_slot_uses_lexicon() {
        let config = EngineConfig::default();
        let analysis = adapter(ClassifierSlot::Absent, &config).analyze("أنا حزين", &[]);
        assert_eq!(analysis.label, "حزين");
        assert!(analysis.scores.is_none());
        assert_eq!(analysis.risk, RiskLevel::Low);
    }

    #[test]
    fn test_loaded_slot_maps_argmax() {
        let config = EngineConfig::default();
        let slot = ClassifierSlot::loaded(FixedBackend(vec![0.1, 3.0, 0.2, 0.0, 0.0]));
        let analysis = adapter(slot, &config).analyze("الطقس عادي", &[]);
        assert_eq!(analysis.label, "قلق");
        assert_eq!(analysis.scores.as_ref().map(|s| s.len()), Some(5));
    }

    #[test]
    fn test_override_applies_on_model_path() {
        let config = EngineConfig::default();
        let slot = ClassifierSlot::loaded(FixedBackend(vec![3.0, 0.0, 0.0, 0.0, 0.0]));
        let analysis = adapter(slot, &config).analyze("مديري لا يطاق", &[]);
        assert_eq!(analysis.label, "work_stress");
        assert!(analysis.scores.is_some());
    }

    #[test]
    fn test_malformed_output_demotes_single_call() {
        let config = EngineConfig::default();
        for raw in [vec![], vec![1.0, 2.0], vec![f32::NAN, 0.0, 0.0, 0.0, 0.0]] {
            let slot = ClassifierSlot::loaded(FixedBackend(raw));
            let analysis = adapter(slot, &config).analyze("أنا سعيد", &[]);
            assert_eq!(analysis.label, "سعيد");
            assert!(analysis.scores.is_none());
        }
    }

    struct PanickingBackend;

    impl ClassifierBackend for PanickingBackend {
        fn infer(&self, _text: &str) -> Result<Vec<f32>, AppError> {
            panic!("onnx session aborted");
        }
        fn label_count(&self) -> usize {
            5
        }
    }

    #[test]
    fn test_panicking_backend_demotes_to_lexicon() {
        let config = EngineConfig::default();
        let a = adapter(ClassifierSlot::loaded(PanickingBackend), &config);

        let analysis = a.analyze("أنا حزين", &[]);
        assert_eq!(analysis.label, "حزين");
        assert!(analysis.scores.is_none());

        // Still usable on the next call
        assert_eq!(a.analyze("أنا سعيد", &[]).label, "سعيد");
    }

    #[test]
    fn test_contextualize_keeps_last_turns() {
        let config = EngineConfig {
            context_turns: 2,
            context_separator: " | ".to_string(),
            ..Default::default()
        };
        let a = adapter(ClassifierSlot::Absent, &config);
        let context = vec!["أول".to_string(), "ثانٍ!".to_string()];
        assert_eq!(a.contextualize("ثالث؟", &context), "ثان | ثالث؟");
    }

    #[test]
    fn test_contextualize_truncates_keeping_newest() {
        let config = EngineConfig {
            max_model_input_chars: 16,
            ..Default::default()
        };
        let recorder = Arc::new(RecordingBackend(Mutex::new(Vec::new())));
        let slot = ClassifierSlot::Loaded(recorder.clone());
        let a = adapter(slot, &config);
        a.analyze("the newest words here", &["older history".to_string()]);

        let seen = recorder.0.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].chars().count(), 16);
        assert_eq!(seen[0], "ewest words here");
    }

    #[test]
    fn test_probe_respects_disabled_flag() {
        let config = EngineConfig {
            classifier_enabled: false,
            ..Default::default()
        };
        let slot = ClassifierSlot::probe(&config);
        assert!(!slot.is_loaded());
        assert_eq!(slot.backend_name(), None);
        assert_eq!(format!("{:?}", slot), "Absent");
    }
}
