//! View Context
//!
//! The only way the controller talks to the view layer: re-render signals
//! keyed by node, transient notices, the connectivity indicator and the open
//! confirmation prompt. The view reads tree snapshots; it never writes.

use crate::components::{Connectivity, Prompt};
use crate::models::NodeKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

/// A transient notification (toast)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Info, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, text: text.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// Signals from the controller to the view layer
pub trait ViewSink {
    /// Children or state of `key` changed
    fn rerender(&self, _key: NodeKey) {}

    fn toast(&self, _notice: Notice) {}

    fn status_changed(&self, _status: Connectivity) {}

    /// The open confirmation prompt changed (`None` = no prompt open)
    fn prompt_changed(&self, _prompt: Option<Prompt>) {}
}

/// Sink for hosts without a view
pub struct NullSink;

impl ViewSink for NullSink {}

#[cfg(target_arch = "wasm32")]
pub use self::signals::ViewSignals;

#[cfg(target_arch = "wasm32")]
mod signals {
    use std::collections::HashMap;

    use leptos::prelude::*;

    use super::{Notice, ViewSink};
    use crate::components::{Connectivity, Prompt};
    use crate::models::NodeKey;

    /// Leptos signals the view subscribes to
    #[derive(Clone, Copy)]
    pub struct ViewSignals {
        /// Per-node revision, bumped on every re-render signal
        pub revisions: RwSignal<HashMap<NodeKey, u32>>,
        pub toast: RwSignal<Option<Notice>>,
        pub status: RwSignal<Connectivity>,
        pub prompt: RwSignal<Option<Prompt>>,
    }

    impl ViewSignals {
        pub fn new() -> Self {
            Self {
                revisions: RwSignal::new(HashMap::new()),
                toast: RwSignal::new(None),
                status: RwSignal::new(Connectivity::Unbound),
                prompt: RwSignal::new(None),
            }
        }

        /// Track this in a view to re-run when `key` changes
        pub fn revision(&self, key: NodeKey) -> u32 {
            self.revisions.with(|revs| revs.get(&key).copied().unwrap_or(0))
        }
    }

    impl Default for ViewSignals {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ViewSink for ViewSignals {
        fn rerender(&self, key: NodeKey) {
            self.revisions.update(|revs| *revs.entry(key).or_insert(0) += 1);
        }

        fn toast(&self, notice: Notice) {
            self.toast.set(Some(notice));
        }

        fn status_changed(&self, status: Connectivity) {
            self.status.set(status);
        }

        fn prompt_changed(&self, prompt: Option<Prompt>) {
            self.prompt.set(prompt);
        }
    }
}
