//! Preflight Check System
//!
//! Inspects the start-up bundle and the classifier slot before serving.
//! Nothing here aborts start-up: missing data degrades to documented
//! fallbacks, and the report only says how degraded the engine will be.

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::brain::classifier::ClassifierSlot;
use crate::bundle::StartupDataBundle;

/// Result of a single check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub details: Option<String>,
}

impl CheckResult {
    fn pass(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            passed: true,
            message: message.to_string(),
            details: None,
        }
    }

    fn fail(name: &str, message: &str, details: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            passed: false,
            message: message.to_string(),
            details,
        }
    }
}

/// Complete preflight check report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreflightReport {
    pub all_passed: bool,
    pub checks: Vec<CheckResult>,
    /// False only when a critical check failed
    pub critical_passed: bool,
    pub classifier_loaded: bool,
    pub summary: String,
}

impl PreflightReport {
    pub fn check(&self, name: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|c| c.name == name)
    }
}

fn is_critical_check(name: &str) -> bool {
    matches!(name, "crisis_keywords")
}

/// Non-empty collection check.
fn check_collection(name: &str, count: usize, fallback: &str) -> CheckResult {
    if count > 0 {
        CheckResult::pass(name, &format!("{} entries", count))
    } else {
        CheckResult::fail(name, "Empty", Some(fallback.to_string()))
    }
}

/// Inspects every bundle collection and the classifier slot.
pub fn run_preflight(bundle: &StartupDataBundle, slot: &ClassifierSlot) -> PreflightReport {
    info!("Running preflight checks");

    let intro = &bundle.intro;
    let intro_pools = [
        &intro.identity,
        &intro.capabilities,
        &intro.trust,
        &intro.general_chat,
    ]
    .iter()
    .filter(|p| !p.is_empty())
    .count();

    let interventions = [&bundle.interventions.grounding, &bundle.interventions.reframing]
        .iter()
        .filter(|p| !p.is_empty())
        .count();

    let mut checks = vec![
        check_collection(
            "lexicon",
            bundle.lexicon.len(),
            "Every utterance scores neutral on the lexicon path",
        ),
        check_collection(
            "crisis_keywords",
            bundle.crisis_keywords.len(),
            "Only the compiled-in crisis keywords are active",
        ),
        check_collection("topics", bundle.topics.len(), "No topic paragraphs in replies"),
        check_collection(
            "override_topics",
            bundle.override_topics.len(),
            "Labels are never replaced by a topic",
        ),
        check_collection("greetings", bundle.greetings.len(), "Greetings fall through to synthesis"),
        check_collection("intro_pools", intro_pools, "Introduction replies use fixed sentences"),
        check_collection("phrase_bank", bundle.phrase_bank.len(), "No canned answers"),
        check_collection(
            "emotion_pools",
            bundle.emotions.populated_buckets(),
            "Replies use the generic validation sentence",
        ),
        check_collection("interventions", interventions, "No grounding or reframing lines"),
        check_collection(
            "insight_themes",
            bundle.insight_themes.len(),
            "Insights come from the wisdom pool only",
        ),
    ];

    checks.push(match slot {
        ClassifierSlot::Loaded(backend) => {
            CheckResult::pass("classifier", &format!("Loaded ({})", backend.name()))
        }
        ClassifierSlot::Absent => CheckResult::fail(
            "classifier",
            "No learned model",
            Some("Lexicon path serves every call".to_string()),
        ),
    });

    let all_passed = checks.iter().all(|c| c.passed);
    let critical_passed = checks
        .iter()
        .filter(|c| is_critical_check(&c.name))
        .all(|c| c.passed);

    let summary = if all_passed {
        "All checks passed. Engine ready.".to_string()
    } else if critical_passed {
        "Some checks failed. Engine serves with fallbacks.".to_string()
    } else {
        "Critical checks failed. Engine serves with built-in safety floor.".to_string()
    };

    for check in &checks {
        if check.passed {
            info!(check = %check.name, "{}", check.message);
        } else if is_critical_check(&check.name) {
            error!(check = %check.name, details = ?check.details, "{}", check.message);
        } else {
            warn!(check = %check.name, details = ?check.details, "{}", check.message);
        }
    }
    info!("Summary: {}", summary);

    PreflightReport {
        all_passed,
        checks,
        critical_passed,
        classifier_loaded: slot.is_loaded(),
        summary,
    }
}
