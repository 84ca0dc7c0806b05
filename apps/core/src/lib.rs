//! Solace core: a rule-based, Arabic-first peer-support conversation engine.
//!
//! Start-up loads a [`bundle::StartupDataBundle`] and optionally probes a
//! learned classifier; serving goes through [`brain::SupportEngine`].

pub mod brain;
pub mod bundle;
pub mod error;
pub mod fs_manager;
pub mod models;
pub mod preflight;

pub use brain::SupportEngine;
pub use error::AppError;

#[cfg(test)]
mod tests;
