//! Greeting and introduction intents.
//!
//! Both are pure substring checks. Greetings run on normalized text,
//! introduction intents on the lowercased raw text so that hamza and
//! punctuation variants in the trigger lists still count.

use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::normalizer::normalize;
use crate::bundle::{draw, GreetingEntry, IntroPools};

/// Introduction questions about the assistant itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntroIntent {
    /// Who are you?
    SelfIdentity,
    /// What can you do?
    Capabilities,
    /// Are you a human? Is this private?
    Trust,
    /// Conversation openers and boredom
    SmallTalk,
}

impl fmt::Display for IntroIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl IntroIntent {
    /// Checked in this order, first hit wins.
    pub const ALL: [IntroIntent; 4] = [
        IntroIntent::SelfIdentity,
        IntroIntent::Capabilities,
        IntroIntent::Trust,
        IntroIntent::SmallTalk,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            IntroIntent::SelfIdentity => "self",
            IntroIntent::Capabilities => "capabilities",
            IntroIntent::Trust => "trust",
            IntroIntent::SmallTalk => "general_chat",
        }
    }

    /// Used when the bundle has no pool for this intent.
    fn fallback(&self) -> &'static str {
        match self {
            IntroIntent::SelfIdentity => "أنا رفيقك الذكي.",
            IntroIntent::Capabilities => "أنا هنا لمساعدتك.",
            IntroIntent::Trust => "أنا هنا لأسمعك بسرية تامة.",
            IntroIntent::SmallTalk => "أنا جاهز للحديث عن أي شيء!",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            IntroIntent::SelfIdentity => &*SELF_PATTERN,
            IntroIntent::Capabilities => &*CAPABILITIES_PATTERN,
            IntroIntent::Trust => &*TRUST_PATTERN,
            IntroIntent::SmallTalk => &*SMALL_TALK_PATTERN,
        }
    }
}

const SELF_TRIGGERS: &[&str] = &[
    "من انت", "من أنت", "عرفني", "مين معي", "مين انت", "اسمك", "عرف عن نفسك", "شكون انت",
];

const CAPABILITIES_TRIGGERS: &[&str] = &[
    "ماذا تفعل", "شو بتعمل", "وظيفتك", "فايدتك", "عملك", "ايش تسوي", "شنو دير", "تطبيق ايش",
    "فائدة التطبيق",
];

const TRUST_TRIGGERS: &[&str] = &[
    "روبوت", "انسان", "بشر", "آلة", "تخزين", "خصوصية", "سرية", "تفضحني", "حقيقي",
];

const SMALL_TALK_TRIGGERS: &[&str] = &[
    "نتعرف", "ندردش", "نسولف", "نتكلم", "احكي", "ملل", "زهقان", "طفشان", "ضايج",
];

/// Literal alternation over a trigger list.
fn alternation(triggers: &[&str]) -> String {
    triggers
        .iter()
        .map(|t| regex::escape(t))
        .collect::<Vec<_>>()
        .join("|")
}

// Compiled once; the trigger lists are constants.
static SELF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&alternation(SELF_TRIGGERS)).expect("Invalid regex: self-identity triggers")
});

static CAPABILITIES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&alternation(CAPABILITIES_TRIGGERS)).expect("Invalid regex: capability triggers")
});

static TRUST_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&alternation(TRUST_TRIGGERS)).expect("Invalid regex: trust triggers")
});

static SMALL_TALK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&alternation(SMALL_TALK_TRIGGERS)).expect("Invalid regex: small-talk triggers")
});

/// Detects introduction intents and answers them from the bundle pools.
#[derive(Debug, Clone, Default)]
pub struct IntroResponder {
    pools: IntroPools,
}

impl IntroResponder {
    pub fn new(pools: IntroPools) -> Self {
        Self { pools }
    }

    /// First intent whose triggers occur in the lowercased raw text.
    pub fn detect(&self, text: &str) -> Option<IntroIntent> {
        let lowered = text.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }
        IntroIntent::ALL
            .into_iter()
            .find(|intent| intent.pattern().is_match(&lowered))
    }

    pub fn pool(&self, intent: IntroIntent) -> &[String] {
        match intent {
            IntroIntent::SelfIdentity => &self.pools.identity,
            IntroIntent::Capabilities => &self.pools.capabilities,
            IntroIntent::Trust => &self.pools.trust,
            IntroIntent::SmallTalk => &self.pools.general_chat,
        }
    }

    pub fn reply<R: Rng + ?Sized>(&self, intent: IntroIntent, rng: &mut R) -> String {
        draw(self.pool(intent), rng)
            .unwrap_or_else(|| intent.fallback())
            .to_string()
    }

    /// Number of intents with a non-empty pool.
    pub fn populated_pools(&self) -> usize {
        IntroIntent::ALL
            .iter()
            .filter(|i| !self.pool(**i).is_empty())
            .count()
    }
}

/// Canned greetings keyed by normalized trigger, in bundle order.
#[derive(Debug, Clone, Default)]
pub struct GreetingMatcher {
    entries: Vec<(String, String)>,
}

impl GreetingMatcher {
    pub fn new(greetings: &[GreetingEntry]) -> Self {
        let entries = greetings
            .iter()
            .filter_map(|g| {
                let trigger = normalize(&g.trigger);
                (!trigger.is_empty()).then(|| (trigger, g.reply.clone()))
            })
            .collect();
        Self { entries }
    }

    /// Reply of the first trigger contained in `normalized`.
    pub fn match_reply(&self, normalized: &str) -> Option<&str> {
        if normalized.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(trigger, _)| normalized.contains(trigger.as_str()))
            .map(|(_, reply)| reply.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
