//! Browser Logger
//!
//! Installs the `log` backend for the browser controller: `console_log` in
//! the webview, a `tracing-subscriber` fmt layer on stderr for native hosts.

use std::sync::OnceLock;

use log::LevelFilter;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("logger not installed: {0}")]
pub struct InitError(String);

static INSTALLED: OnceLock<Result<(), InitError>> = OnceLock::new();

/// Install the logger (first call) and set the max level (every call).
///
/// Fails if some other logger was installed before the first call.
pub fn init(level: LevelFilter) -> Result<(), InitError> {
    let installed = INSTALLED.get_or_init(install).clone();
    log::set_max_level(level);
    installed
}

/// Parse a level name ("debug", "WARN", ...), defaulting to `Info`.
pub fn parse_level(name: &str) -> LevelFilter {
    name.trim().parse().unwrap_or(LevelFilter::Info)
}

#[cfg(target_arch = "wasm32")]
fn install() -> Result<(), InitError> {
    console_log::init_with_level(log::Level::Trace).map_err(|e| InitError(e.to_string()))
}

#[cfg(not(target_arch = "wasm32"))]
fn install() -> Result<(), InitError> {
    use tracing_subscriber::fmt::time::ChronoLocal;

    // `log` records reach the subscriber through its LogTracer bridge
    tracing_subscriber::fmt()
        .with_max_level(tracing_subscriber::filter::LevelFilter::TRACE)
        .with_timer(ChronoLocal::new("%H:%M:%S%.3f".to_string()))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| InitError(e.to_string()))
}
