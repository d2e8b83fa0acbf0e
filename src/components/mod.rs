//! Controller Components
//!
//! Binding, expansion, mutations, connectivity and confirmation. Each one
//! shares the tree and the view sink through `Rc`.

mod binder;
mod confirm_gate;
mod connectivity;
mod expansion;
mod mutation;

pub use binder::{Announcement, BackendBinder, ReadinessSlot};
pub use confirm_gate::{ConfirmationGate, Prompt, PromptId};
pub use connectivity::{Connectivity, ConnectivityReporter};
pub use expansion::{Expansion, ExpansionController, ToggleOutcome};
pub use mutation::{MutationCoordinator, MutationOutcome};
