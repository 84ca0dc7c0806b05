//! Test Module
//!
//! Cross-component tests for the Solace core.
//!
//! ## Test Categories
//! - `brain_tests`: normalization, lexicon, topic and reply-cascade behavior over the built-in data
//! - `crisis_tests`: the crisis gate across keywords, casing, labels and active topics
//! - `integration_tests`: full turns, external bundles, configuration and classifier backends

pub mod brain_tests;
