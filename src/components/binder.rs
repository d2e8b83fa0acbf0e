//! Backend Binder
//!
//! Waits for the host to expose the backend capability, with a bounded
//! poll-with-timeout, and caches the first handle it gets. One background
//! wait with a longer budget can replace the cache later.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use futures::channel::oneshot;
use futures::future::{self, LocalBoxFuture, Shared};
use futures::FutureExt;
use log::{debug, info, warn};

use crate::backend::BackendHandle;
use crate::components::connectivity::{Connectivity, ConnectivityReporter};
use crate::config::BrowserConfig;
use crate::platform::{sleep, spawn_local};

/// Where the host publishes the backend once it is up
pub trait ReadinessSlot {
    /// Current content of the slot
    fn probe(&self) -> Option<BackendHandle>;

    /// Resolves when the host announces readiness. The announcement is a hint;
    /// the slot is probed again afterwards.
    fn notified(&self) -> LocalBoxFuture<'static, ()>;
}

/// One-shot readiness announcement. A slot registers its listener once and
/// hands every bind attempt a clone; all of them resolve when it fires. If
/// the sender is dropped unfired, it never resolves.
#[derive(Clone)]
pub struct Announcement(Shared<LocalBoxFuture<'static, ()>>);

impl Announcement {
    pub fn channel() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel::<()>();
        let fired = async move {
            if rx.await.is_err() {
                future::pending::<()>().await;
            }
        }
        .boxed_local()
        .shared();
        (tx, Self(fired))
    }

    pub fn wait(&self) -> LocalBoxFuture<'static, ()> {
        self.0.clone().boxed_local()
    }
}

pub struct BackendBinder {
    slot: Rc<dyn ReadinessSlot>,
    cached: RefCell<Option<BackendHandle>>,
    rebind_issued: Cell<bool>,
    poll_interval: Duration,
    foreground_timeout: Duration,
    background_timeout: Duration,
    connectivity: Rc<ConnectivityReporter>,
}

impl BackendBinder {
    pub fn new(slot: Rc<dyn ReadinessSlot>, config: &BrowserConfig, connectivity: Rc<ConnectivityReporter>) -> Self {
        Self {
            slot,
            cached: RefCell::new(None),
            rebind_issued: Cell::new(false),
            poll_interval: config.poll_interval(),
            foreground_timeout: config.bind_timeout(),
            background_timeout: config.background_bind_timeout(),
            connectivity,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.cached.borrow().is_some()
    }

    pub fn foreground_timeout(&self) -> Duration {
        self.foreground_timeout
    }

    /// Bind with the foreground budget
    pub async fn bind_foreground(&self) -> Option<BackendHandle> {
        self.bind(self.foreground_timeout).await
    }

    /// Cached handle, or wait up to `timeout` for the slot. `None` on timeout;
    /// callers decide whether to try again.
    pub async fn bind(&self, timeout: Duration) -> Option<BackendHandle> {
        if let Some(handle) = self.cached.borrow().clone() {
            return Some(handle);
        }

        self.connectivity.begin_check();
        match self.wait_for_slot(timeout).await {
            Some(handle) => {
                // Another bind may have landed first; the first one wins
                let handle = self.cached.borrow_mut().get_or_insert(handle).clone();
                info!("[BIND] backend bound");
                self.connectivity.mark_bound();
                Some(handle)
            }
            None => {
                warn!("[BIND] backend not available after {} ms", timeout.as_millis());
                self.connectivity.mark_unreachable();
                None
            }
        }
    }

    /// Issue the one background wait. `on_bound` runs if it finds the backend
    /// while the UI was not already bound. Returns false if already issued.
    pub fn spawn_background_rebind<F>(self: &Rc<Self>, on_bound: F) -> bool
    where
        F: FnOnce(BackendHandle) + 'static,
    {
        if self.rebind_issued.replace(true) {
            debug!("[BIND] background rebind already issued");
            return false;
        }

        let binder = Rc::clone(self);
        spawn_local(async move {
            debug!("[BIND] background rebind waiting up to {} ms", binder.background_timeout.as_millis());
            let Some(handle) = binder.wait_for_slot(binder.background_timeout).await else {
                warn!("[BIND] background rebind gave up");
                return;
            };

            let was_bound = binder.connectivity.state() == Connectivity::Bound;
            *binder.cached.borrow_mut() = Some(handle.clone());
            if was_bound {
                debug!("[BIND] background rebind refreshed the cached handle");
                return;
            }
            info!("[BIND] backend recovered by background rebind");
            binder.connectivity.begin_check();
            binder.connectivity.mark_bound();
            on_bound(handle);
        });
        true
    }

    /// Race the poll loop, the readiness notification and the deadline
    async fn wait_for_slot(&self, timeout: Duration) -> Option<BackendHandle> {
        if let Some(handle) = self.slot.probe() {
            return Some(handle);
        }

        let interval = self.poll_interval;
        let slot = Rc::clone(&self.slot);
        let polling = async move {
            loop {
                sleep(interval).await;
                if let Some(handle) = slot.probe() {
                    return Some(handle);
                }
            }
        }
        .boxed_local();

        let slot = Rc::clone(&self.slot);
        let ready = self.slot.notified();
        let notified = async move {
            ready.await;
            match slot.probe() {
                Some(handle) => Some(handle),
                None => {
                    debug!("[BIND] readiness announced but slot still empty");
                    future::pending().await
                }
            }
        }
        .boxed_local();

        let deadline = async move {
            sleep(timeout).await;
            None
        }
        .boxed_local();

        let (handle, _, _) = future::select_all([polling, notified, deadline]).await;
        handle
    }
}
