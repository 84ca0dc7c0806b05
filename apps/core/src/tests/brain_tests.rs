//! Brain Module Tests
//!
//! Behavior of the individual brain components over the built-in bundle.

use crate::brain::composer::{FALLBACK_REPLY, TAG_GENERAL, TAG_GREETING, TAG_INTRO};
use crate::brain::lexicon::NEUTRAL_LABEL;
use crate::brain::normalizer::{normalize, stem, tokenize};
use crate::brain::{ClassifierSlot, EmotionBucket, LexiconSentimentModel, RiskLevel, SupportEngine};
use crate::bundle::{EngineData, StartupDataBundle};
use crate::models::EngineConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Engine over the built-in data with every random branch pinned.
fn engine_with(grounding: f32, reframing: f32, long_question: f32) -> SupportEngine {
    let config = EngineConfig {
        grounding_probability: grounding,
        reframing_probability: reframing,
        long_question_probability: long_question,
        ..EngineConfig::default()
    };
    SupportEngine::new(&StartupDataBundle::builtin(), config, ClassifierSlot::Absent)
}

fn rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

#[cfg(test)]
mod normalizer_tests {
    use super::*;

    #[test]
    fn test_lexicon_words_survive_their_own_pipeline() {
        let bundle = StartupDataBundle::builtin();
        let data = EngineData::from_bundle(&bundle, &EngineConfig::default());

        for entry in &bundle.lexicon {
            let tokens = tokenize(&entry.word);
            assert_eq!(tokens.len(), 1, "'{}' should be one token", entry.word);
            assert!(
                data.stems.lookup(&stem(&tokens[0])).is_some(),
                "'{}' should be found through its own stem",
                entry.word
            );
        }
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "أنا   حزينٌ جداً!!",
            "Hello, WORLD",
            "مرحبا، كيف حالك؟",
            "  ",
            "end-my-life",
        ];
        for sample in samples {
            let once = normalize(sample);
            assert_eq!(normalize(&once), once, "not idempotent for '{}'", sample);
        }
    }
}

#[cfg(test)]
mod lexicon_tests {
    use super::*;

    fn model() -> LexiconSentimentModel {
        let data = EngineData::from_bundle(&StartupDataBundle::builtin(), &EngineConfig::default());
        LexiconSentimentModel::new(Arc::new(data))
    }

    #[test]
    fn test_every_lexicon_label_has_an_emotion_bucket() {
        let bundle = StartupDataBundle::builtin();
        let m = model();

        for entry in &bundle.lexicon {
            let label = m.score(&entry.word);
            assert_ne!(label, NEUTRAL_LABEL, "'{}' scored neutral", entry.word);
            assert_ne!(
                EmotionBucket::from_label(&label),
                EmotionBucket::Neutral,
                "label '{}' has no bucket",
                label
            );
        }
    }

    #[test]
    fn test_feminine_forms_share_a_label() {
        let m = model();
        assert_eq!(m.score("أنا سعيدة"), m.score("أنا سعيد"));
        assert_eq!(
            EmotionBucket::from_label(&m.score("أنا حزينة")),
            EmotionBucket::Sad
        );
    }

    #[test]
    fn test_last_emotion_word_names_the_turn() {
        let m = model();
        assert_eq!(m.score("كنت حزين والآن أنا سعيد"), "سعيد");
        assert_eq!(m.score("كنت سعيد والآن أنا حزين"), "حزين");
    }
}

#[cfg(test)]
mod composer_tests {
    use super::*;

    #[test]
    fn test_greeting_inside_a_sentence() {
        let engine = engine_with(0.0, 0.0, 0.0);
        let c = engine.compose_with_rng(NEUTRAL_LABEL, RiskLevel::Low, "مرحبا، كيف حالك؟", &[], None, &mut rng());
        assert_eq!(c.tag, TAG_GREETING);
        assert_eq!(c.reply, "مرحباً! أنا هنا للاستماع عندما تحتاج.");
    }

    #[test]
    fn test_introduction_questions() {
        let engine = engine_with(0.0, 0.0, 0.0);
        let intro = &StartupDataBundle::builtin().intro;

        let cases: [(&str, &Vec<String>); 3] = [
            ("من انت؟", &intro.identity),
            ("هل أنت روبوت", &intro.trust),
            ("أشعر بالملل", &intro.general_chat),
        ];
        for (text, pool) in cases {
            let c = engine.compose_with_rng(NEUTRAL_LABEL, RiskLevel::Low, text, &[], None, &mut rng());
            assert_eq!(c.tag, TAG_INTRO, "'{}' should be an intro question", text);
            assert!(pool.contains(&c.reply), "'{}' answered from the wrong pool", text);
        }
    }

    #[test]
    fn test_phrase_bank_answers_close_questions() {
        let engine = engine_with(0.0, 0.0, 0.0);
        let c = engine.compose_with_rng("قلق", RiskLevel::Low, "ما هو القلق؟", &[], None, &mut rng());
        assert_eq!(c.tag, TAG_GENERAL);
        assert!(c.reply.starts_with("القلق استجابة طبيعية"));
    }

    #[test]
    fn test_short_message_gets_validation_and_question() {
        let engine = engine_with(0.0, 0.0, 0.0);
        let sad = &StartupDataBundle::builtin().emotions.sad;

        let c = engine.compose_with_rng("حزين", RiskLevel::Low, "أنا حزين", &[], None, &mut rng());
        assert!(sad.validation.iter().any(|v| c.reply.starts_with(v.as_str())));
        assert!(sad.questions.iter().any(|q| c.reply.ends_with(q.as_str())));
        assert_eq!(c.tag, TAG_GENERAL);
        assert_eq!(c.active_topic, None);
    }

    #[test]
    fn test_long_message_can_skip_the_question() {
        let engine = engine_with(0.0, 0.0, 0.0);
        let happy = &StartupDataBundle::builtin().emotions.happy;
        let text = "اليوم كان يوما طويلا جدا وانا سعيد بكل ما حدث فيه";

        let c = engine.compose_with_rng("سعيد", RiskLevel::Low, text, &[], None, &mut rng());
        assert!(happy.validation.contains(&c.reply), "unexpected reply: {}", c.reply);
    }

    #[test]
    fn test_grounding_for_sad_messages() {
        let engine = engine_with(1.0, 0.0, 0.0);
        let grounding = &StartupDataBundle::builtin().interventions.grounding;

        let c = engine.compose_with_rng("حزين", RiskLevel::Low, "أنا حزين", &[], None, &mut rng());
        assert!(grounding.iter().any(|g| c.reply.ends_with(g.as_str())));
    }

    #[test]
    fn test_no_grounding_for_happy_messages() {
        let engine = engine_with(1.0, 1.0, 0.0);
        let interventions = &StartupDataBundle::builtin().interventions;

        let c = engine.compose_with_rng("سعيد", RiskLevel::Low, "أنا سعيد", &[], None, &mut rng());
        assert!(!interventions.grounding.iter().any(|g| c.reply.contains(g.as_str())));
        assert!(interventions.reframing.iter().any(|r| c.reply.ends_with(r.as_str())));
    }

    #[test]
    fn test_new_topic_replaces_active_topic() {
        let engine = engine_with(0.0, 0.0, 0.0);
        let c = engine.compose_with_rng(
            "مشكلة",
            RiskLevel::Low,
            "عندي مشكلة مع أمي",
            &[],
            Some("دراسة"),
            &mut rng(),
        );
        assert_eq!(c.tag, "عائلة");
        assert_eq!(c.new_active_topic(), "عائلة");
    }

    #[test]
    fn test_continuation_without_pool_falls_through() {
        let engine = engine_with(0.0, 0.0, 0.0);
        let c = engine.compose_with_rng(
            NEUTRAL_LABEL,
            RiskLevel::Low,
            "كمل",
            &[],
            Some("work_stress"),
            &mut rng(),
        );
        assert_eq!(c.tag, "work_stress");
        assert_eq!(c.active_topic.as_deref(), Some("work_stress"));
        assert_ne!(c.reply, FALLBACK_REPLY);
    }

    #[test]
    fn test_punctuation_only_is_fallback() {
        let engine = engine_with(0.0, 0.0, 0.0);
        let c = engine.compose_with_rng(NEUTRAL_LABEL, RiskLevel::Low, "!!! ...", &[], Some("عمل"), &mut rng());
        assert_eq!(c.reply, FALLBACK_REPLY);
        assert_eq!(c.active_topic.as_deref(), Some("عمل"));
    }
}

#[cfg(test)]
mod insight_tests {
    use super::*;

    #[test]
    fn test_theme_sentences_are_deterministic() {
        let engine = SupportEngine::builtin();
        let a = engine.generate_insight_with_rng("خائف من كل شيء", &mut StdRng::seed_from_u64(1));
        let b = engine.generate_insight_with_rng("خائف من كل شيء", &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
        assert_eq!(engine.data().insight.theme_for("خائف من كل شيء"), Some("fear"));
    }

    #[test]
    fn test_unthemed_worry_draws_wisdom() {
        let engine = SupportEngine::builtin();
        let wisdom = &StartupDataBundle::builtin().wisdom;
        let insight = engine.generate_insight_with_rng("لا أعرف", &mut rng());
        assert!(wisdom.contains(&insight));
    }
}
