//! Sentiment backend built on FastEmbed embeddings.
//!
//! Each class is described by a handful of phrases. The descriptions are
//! embedded once at load time; an utterance is scored by cosine similarity
//! against every class prototype.
//!
//! The model is `paraphrase-multilingual-MiniLM-L12-v2`
//! (`EmbeddingModel::ParaphraseMLMiniLML12V2`), which covers Arabic as well
//! as English.

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::path::PathBuf;
use tracing::{debug, info};

use super::classifier::{ClassifierBackend, MODEL_LABELS};
use crate::error::AppError;

/// Class description, one per model label slot
struct ClassPrototype {
    descriptions: &'static [&'static str],
}

/// Same order as the classifier label table
const CLASS_PROTOTYPES: &[ClassPrototype] = &[
    // حزين
    ClassPrototype {
        descriptions: &[
            "أنا حزين ومكتئب ومتضايق",
            "أشعر باليأس والإحباط",
            "feeling sad depressed hopeless",
        ],
    },
    // قلق
    ClassPrototype {
        descriptions: &[
            "أنا قلق ومتوتر وخائف",
            "أفكار كثيرة ولا أستطيع أن أرتاح",
            "feeling anxious worried nervous",
        ],
    },
    // Neutral statements
    ClassPrototype {
        descriptions: &["يوم عادي لا شيء جديد", "an ordinary day nothing special"],
    },
    // Questions and requests
    ClassPrototype {
        descriptions: &["عندي سؤال كيف أفعل هذا", "asking a question or a request for advice"],
    },
    // Positive or thankful
    ClassPrototype {
        descriptions: &["شكرا أنا بخير والحمد لله", "thank you I am fine and happy"],
    },
];

/// Multilingual sentence model; the prototypes and most input are Arabic.
const MODEL: EmbeddingModel = EmbeddingModel::ParaphraseMLMiniLML12V2;

/// Embedding-prototype classifier
pub struct EmbeddingPrototypeBackend {
    model: TextEmbedding,
    prototypes: Vec<Vec<f32>>,
}

impl EmbeddingPrototypeBackend {
    /// Loads the multilingual MiniLM model from (or downloads it into) `cache_dir`.
    pub fn try_new(cache_dir: PathBuf) -> Result<Self, AppError> {
        let mut options = InitOptions::new(MODEL);
        options.show_download_progress = false;
        options.cache_dir = cache_dir;

        let model = TextEmbedding::try_new(options)
            .map_err(|e| AppError::Inference(format!("Failed to load embedding model: {}", e)))?;
        let prototypes = Self::precompute_prototypes(&model)?;

        Ok(Self { model, prototypes })
    }

    fn precompute_prototypes(model: &TextEmbedding) -> Result<Vec<Vec<f32>>, AppError> {
        info!("Pre-computing class prototypes...");

        let texts: Vec<String> = CLASS_PROTOTYPES
            .iter()
            .map(|p| p.descriptions.join(" "))
            .collect();
        let embeddings = model
            .embed(texts, None)
            .map_err(|e| AppError::Inference(format!("Failed to embed prototypes: {}", e)))?;

        if embeddings.len() != CLASS_PROTOTYPES.len() {
            return Err(AppError::Inference(format!(
                "expected {} prototypes, got {}",
                CLASS_PROTOTYPES.len(),
                embeddings.len()
            )));
        }

        info!("Pre-computed {} class prototypes", embeddings.len());
        Ok(embeddings)
    }
}

impl ClassifierBackend for EmbeddingPrototypeBackend {
    fn infer(&self, text: &str) -> Result<Vec<f32>, AppError> {
        let embedding = self
            .model
            .embed(vec![text.to_string()], None)
            .map_err(|e| AppError::Inference(format!("Embedding error: {}", e)))?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Inference("Empty embedding".to_string()))?;

        let scores: Vec<f32> = self
            .prototypes
            .iter()
            .map(|prototype| cosine_similarity(&embedding, prototype))
            .collect();
        debug!(?scores, "Prototype similarities");
        Ok(scores)
    }

    fn label_count(&self) -> usize {
        MODEL_LABELS.len()
    }

    fn name(&self) -> &str {
        "embedding-prototype"
    }
}

/// Calculate cosine similarity between two vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return 0.0;
    }

    dot_product / (magnitude_a * magnitude_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &[1.0, 0.0, 0.0]) - 1.0).abs() < 0.001);
        assert!(cosine_similarity(&a, &[0.0, 1.0, 0.0]).abs() < 0.001);
        assert!((cosine_similarity(&a, &[-2.0, 0.0, 0.0]) + 1.0).abs() < 0.001);
        assert_eq!(cosine_similarity(&a, &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&a, &[0.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_model_is_multilingual() {
        assert!(matches!(MODEL, EmbeddingModel::ParaphraseMLMiniLML12V2));
    }

    #[test]
    fn test_one_prototype_per_label() {
        assert_eq!(CLASS_PROTOTYPES.len(), MODEL_LABELS.len());
        assert!(CLASS_PROTOTYPES.iter().all(|p| !p.descriptions.is_empty()));
    }
}
