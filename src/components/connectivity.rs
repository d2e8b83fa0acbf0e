//! Connectivity Reporter
//!
//! Small state machine behind the "DB:" indicator.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::context::ViewSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Connectivity {
    #[default]
    Unbound,
    Checking,
    Bound,
    Unreachable,
}

impl Connectivity {
    pub fn label(&self) -> &'static str {
        match self {
            Connectivity::Unbound => "DB: not connected",
            Connectivity::Checking => "DB: connecting…",
            Connectivity::Bound => "DB: connected",
            Connectivity::Unreachable => "DB: unreachable",
        }
    }

    fn can_move_to(self, next: Connectivity) -> bool {
        use Connectivity::*;
        matches!(
            (self, next),
            (Unbound, Checking) | (Checking, Bound) | (Checking, Unreachable) | (Unreachable, Checking) | (Bound, Unreachable)
        )
    }
}

pub struct ConnectivityReporter {
    state: Cell<Connectivity>,
    sink: Rc<dyn ViewSink>,
}

impl ConnectivityReporter {
    pub fn new(sink: Rc<dyn ViewSink>) -> Self {
        Self { state: Cell::new(Connectivity::Unbound), sink }
    }

    pub fn state(&self) -> Connectivity {
        self.state.get()
    }

    pub fn label(&self) -> &'static str {
        self.state().label()
    }

    /// A bind attempt started
    pub fn begin_check(&self) {
        self.transition(Connectivity::Checking);
    }

    pub fn mark_bound(&self) {
        self.transition(Connectivity::Bound);
    }

    pub fn mark_unreachable(&self) {
        self.transition(Connectivity::Unreachable);
    }

    /// A top-level listing came back; proves the backend is up
    pub fn listing_succeeded(&self) {
        if self.state() != Connectivity::Bound {
            self.transition(Connectivity::Checking);
            self.transition(Connectivity::Bound);
        }
    }

    /// A top-level listing failed at the transport level
    pub fn listing_failed(&self) {
        if self.state() == Connectivity::Bound {
            warn!("[CONN] top-level listing failed, demoting");
        }
        self.transition(Connectivity::Unreachable);
    }

    /// A mutating call never reached the backend
    pub fn mutation_failed(&self) {
        warn!("[CONN] mutation call lost in transport");
        self.transition(Connectivity::Unreachable);
    }

    /// An ancillary fetch failed; never demotes
    pub fn ancillary_failed(&self, what: &str) {
        debug!("[CONN] ancillary fetch failed ({}), state stays {:?}", what, self.state());
    }

    fn transition(&self, next: Connectivity) {
        let current = self.state.get();
        if current == next {
            return;
        }
        if !current.can_move_to(next) {
            debug!("[CONN] ignored {:?} -> {:?}", current, next);
            return;
        }
        info!("[CONN] {:?} -> {:?}", current, next);
        self.state.set(next);
        self.sink.status_changed(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::NullSink;

    fn reporter() -> ConnectivityReporter {
        ConnectivityReporter::new(Rc::new(NullSink))
    }

    #[test]
    fn test_bind_path() {
        let conn = reporter();
        assert_eq!(conn.label(), "DB: not connected");
        conn.begin_check();
        conn.mark_bound();
        assert_eq!(conn.state(), Connectivity::Bound);
        assert_eq!(conn.label(), "DB: connected");
    }

    #[test]
    fn test_ancillary_failure_does_not_demote() {
        let conn = reporter();
        conn.listing_succeeded();
        conn.ancillary_failed("list_items for sub-collection 5");
        assert_eq!(conn.state(), Connectivity::Bound);

        conn.listing_failed();
        assert_eq!(conn.state(), Connectivity::Unreachable);
    }

    #[test]
    fn test_invalid_transitions_ignored() {
        let conn = reporter();
        // Unbound cannot jump straight to Bound
        conn.mark_bound();
        assert_eq!(conn.state(), Connectivity::Unbound);

        conn.begin_check();
        conn.mark_unreachable();
        conn.mark_bound();
        assert_eq!(conn.state(), Connectivity::Unreachable);

        // Retry goes back through Checking
        conn.begin_check();
        conn.mark_bound();
        assert_eq!(conn.state(), Connectivity::Bound);
    }
}
