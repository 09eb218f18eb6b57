//! Subscriber setup

use std::str::FromStr;

use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Targets the level applies to
const TARGETS: &[&str] = &[
    "minote_cli",
    "minote_config",
    "minote_core",
    "minote_markup",
    "minote_remote",
    "minote_sync",
    "minote_vault",
];

/// Resolve the effective level: command line, then config, then `info`.
pub fn effective_level(requested: Option<LevelFilter>, configured: &str) -> LevelFilter {
    requested
        .or_else(|| LevelFilter::from_str(configured.trim()).ok())
        .unwrap_or(LevelFilter::INFO)
}

/// Directive string enabling `level` for every workspace crate
pub fn directives(level: LevelFilter) -> String {
    let level = level.to_string().to_ascii_lowercase();
    TARGETS
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Install the global subscriber; `RUST_LOG` wins when set.
pub fn init(level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
