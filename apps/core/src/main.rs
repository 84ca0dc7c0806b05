// Solace command-line entry point
// Reads one utterance per line on stdin, writes one JSON object per line on stdout.

use anyhow::Result;
use serde_json::json;
use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

use solace_core::brain::{ClassifierSlot, SupportEngine};
use solace_core::bundle::StartupDataBundle;
use solace_core::fs_manager::PortablePathManager;
use solace_core::models::EngineConfig;
use solace_core::preflight::{run_preflight, PreflightReport};

/// One input line
enum Command<'a> {
    Insight(&'a str),
    Quote,
    Preflight,
    Say(&'a str),
}

impl<'a> Command<'a> {
    fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        if let Some(worry) = trimmed.strip_prefix("/insight ") {
            Command::Insight(worry)
        } else if trimmed == "/quote" {
            Command::Quote
        } else if trimmed == "/preflight" {
            Command::Preflight
        } else {
            Command::Say(line)
        }
    }
}

/// Structured JSON logs on stderr; RUST_LOG overrides the default level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let formatting_layer = BunyanFormattingLayer::new("solace".into(), io::stderr);
    let subscriber = Registry::default()
        .with(filter)
        .with(JsonStorageLayer)
        .with(formatting_layer);

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}

fn main() -> Result<()> {
    init_tracing();

    if let Err(e) = PortablePathManager::init() {
        error!("Failed to initialize data directories: {}", e);
    }

    let config = match EngineConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            warn!("Invalid configuration, using defaults: {}", e);
            EngineConfig::default()
        }
    };

    let bundle = StartupDataBundle::load_or_builtin(&PortablePathManager::bundle_path());
    let slot = ClassifierSlot::probe(&config);
    let report: PreflightReport = run_preflight(&bundle, &slot);
    let engine = SupportEngine::new(&bundle, config, slot);

    let context_turns = engine.config().context_turns;
    let mut history: VecDeque<String> = VecDeque::with_capacity(context_turns + 1);
    let mut active_topic: Option<String> = None;

    let stdin = io::stdin();
    let mut stdout = io::stdout().lock();
    info!("Ready for input");

    for line in stdin.lock().lines() {
        let line = line?;
        let output = match Command::parse(&line) {
            Command::Insight(worry) => json!({ "insight": engine.generate_insight(worry) }),
            Command::Quote => json!({ "quote": engine.daily_quote(&mut rand::thread_rng()) }),
            Command::Preflight => serde_json::to_value(&report)?,
            Command::Say(text) => {
                let context: Vec<String> = history.iter().cloned().collect();
                let packet = engine.respond(text, &context, active_topic.as_deref());

                active_topic = packet.active_topic.clone();
                if !text.trim().is_empty() {
                    history.push_back(text.to_string());
                    while history.len() > context_turns {
                        history.pop_front();
                    }
                }
                serde_json::to_value(&packet)?
            }
        };

        writeln!(stdout, "{}", output)?;
        stdout.flush()?;
    }

    Ok(())
}
