//! Pool Browser
//!
//! Controller behind the collection / sub-collection / item browser: binds
//! to a backend that may come up late, loads the tree lazily, and keeps it
//! consistent across mutations and confirmation prompts. Rendering is left
//! to the view layer, which reads tree snapshots and reacts to `ViewSink`
//! signals.

pub mod backend;
pub mod browser;
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod platform;
pub mod tree;

#[cfg(target_arch = "wasm32")]
pub mod commands;

#[cfg(test)]
mod testing;

pub use backend::{Backend, BackendHandle, OpResult};
pub use browser::{CollectionSummary, ResourceBrowser};
pub use components::{
    Announcement, BackendBinder, ConfirmationGate, Connectivity, ConnectivityReporter, Expansion, ExpansionController,
    MutationCoordinator, MutationOutcome, Prompt, PromptId, ReadinessSlot, ToggleOutcome,
};
pub use config::{BrowserConfig, ConfigError};
pub use context::{Notice, NoticeKind, NullSink, ViewSink};
pub use error::{BackendError, BrowserError};
pub use tree::{Generation, LoadState, ResourceTree, Row, SharedTree};

#[cfg(target_arch = "wasm32")]
pub use context::ViewSignals;

/// Build the browser for the webview and start it in the background.
///
/// Returns the browser and the signals the view subscribes to; the caller
/// usually hands both to `provide_context`.
#[cfg(target_arch = "wasm32")]
pub fn launch(config: BrowserConfig) -> (std::rc::Rc<ResourceBrowser>, ViewSignals) {
    use std::rc::Rc;

    console_error_panic_hook::set_once();
    if let Err(err) = browser_logger::init(browser_logger::parse_level(&config.log_level)) {
        web_sys::console::warn_1(&format!("[APP] {}", err).into());
    }
    let config = config.or_default();

    let signals = ViewSignals::new();
    let slot = Rc::new(commands::TauriSlot::new(config.ready_event.clone()));
    let browser = Rc::new(ResourceBrowser::new(config, slot, Rc::new(signals)));

    let starting = browser.clone();
    platform::spawn_local(async move {
        starting.start().await;
    });
    (browser, signals)
}
