//! Expansion Controller
//!
//! Lazy per-node loading behind the expand/collapse toggles. Every fetch is
//! tagged with the generation it was issued under; results for an older
//! generation, or for a node collapsed in the meantime, are dropped.

use std::rc::Rc;

use log::{debug, info, warn};

use crate::components::binder::BackendBinder;
use crate::components::connectivity::ConnectivityReporter;
use crate::context::{Notice, ViewSink};
use crate::error::{BrowserError, BrowserResult};
use crate::models::{ChildList, NodeKey};
use crate::tree::{Generation, LoadState, SharedTree};

/// What the user sees for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expansion {
    Collapsed,
    Expanding,
    Loaded,
    Failed,
}

impl From<LoadState> for Expansion {
    fn from(state: LoadState) -> Self {
        match state {
            LoadState::NotLoaded => Expansion::Collapsed,
            LoadState::Loading => Expansion::Expanding,
            LoadState::Loaded => Expansion::Loaded,
            LoadState::Failed => Expansion::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    Collapsed,
    /// Children applied (count)
    Loaded(usize),
    Failed(BrowserError),
    /// A newer load or a collapse took over; nothing was applied
    Superseded,
}

pub struct ExpansionController {
    tree: SharedTree,
    binder: Rc<BackendBinder>,
    connectivity: Rc<ConnectivityReporter>,
    sink: Rc<dyn ViewSink>,
}

impl ExpansionController {
    pub fn new(
        tree: SharedTree,
        binder: Rc<BackendBinder>,
        connectivity: Rc<ConnectivityReporter>,
        sink: Rc<dyn ViewSink>,
    ) -> Self {
        Self { tree, binder, connectivity, sink }
    }

    pub fn state(&self, key: NodeKey) -> Expansion {
        self.tree.borrow().load_state(key).map_or(Expansion::Collapsed, Expansion::from)
    }

    /// Collapsed nodes expand; anything else collapses
    pub async fn toggle(&self, key: NodeKey) -> ToggleOutcome {
        match self.state(key) {
            Expansion::Collapsed => self.expand(key).await,
            _ => {
                self.collapse(key);
                ToggleOutcome::Collapsed
            }
        }
    }

    /// Load children unless already loading or loaded. A failed node retries.
    pub async fn expand(&self, key: NodeKey) -> ToggleOutcome {
        let issued = {
            let mut tree = self.tree.borrow_mut();
            match tree.load_state(key) {
                None => None,
                Some(LoadState::Loading) => return ToggleOutcome::Superseded,
                Some(LoadState::Loaded) => {
                    return ToggleOutcome::Loaded(tree.snapshot(key).map_or(0, |s| s.children.len()));
                }
                Some(_) => tree.begin_load(key),
            }
        };
        let Some(generation) = issued else {
            warn!("[EXPAND] {} is not in the tree", key);
            return ToggleOutcome::Failed(BrowserError::Validation(format!("{} is not loaded", key)));
        };
        debug!("[EXPAND] {} expanding (generation {})", key, generation);
        self.sink.rerender(key);
        self.fetch_into(key, generation).await
    }

    /// Hide children right away. Any in-flight fetch keeps running and is
    /// dropped when it lands.
    pub fn collapse(&self, key: NodeKey) -> bool {
        let collapsed = self.tree.borrow_mut().collapse(key);
        if collapsed {
            debug!("[EXPAND] {} collapsed", key);
            self.sink.rerender(key);
        }
        collapsed
    }

    /// Re-fetch a node in place, keeping its children visible meanwhile
    pub async fn reload(&self, key: NodeKey) -> ToggleOutcome {
        let Some(generation) = self.tree.borrow_mut().begin_refresh(key) else {
            debug!("[EXPAND] reload of {} skipped, node is gone", key);
            return ToggleOutcome::Superseded;
        };
        self.fetch_into(key, generation).await
    }

    /// Reload an open node; a closed one is only invalidated so the next
    /// expansion fetches fresh data. The root is always reloaded.
    pub async fn refresh(&self, key: NodeKey) -> ToggleOutcome {
        let state = self.tree.borrow().load_state(key);
        match state {
            None => ToggleOutcome::Superseded,
            Some(LoadState::NotLoaded) if key != NodeKey::Root => {
                self.tree.borrow_mut().invalidate(key);
                self.sink.rerender(key);
                ToggleOutcome::Collapsed
            }
            Some(_) => self.reload(key).await,
        }
    }

    /// Full reload: discard everything below the root and list collections
    pub async fn load_root(&self) -> ToggleOutcome {
        let Some(generation) = self.tree.borrow_mut().begin_load(NodeKey::Root) else {
            return ToggleOutcome::Superseded;
        };
        info!("[EXPAND] loading collections (generation {})", generation);
        self.sink.rerender(NodeKey::Root);
        self.fetch_into(NodeKey::Root, generation).await
    }

    async fn fetch_into(&self, key: NodeKey, generation: Generation) -> ToggleOutcome {
        let listing = self.fetch(key).await;

        match listing {
            Ok(children) => {
                self.connectivity.listing_succeeded();
                let count = children.len();
                if !self.tree.borrow_mut().set_children(key, generation, children) {
                    debug!("[EXPAND] {} generation {} superseded", key, generation);
                    return ToggleOutcome::Superseded;
                }
                debug!("[EXPAND] {} loaded {} children", key, count);
                self.sink.rerender(key);
                ToggleOutcome::Loaded(count)
            }
            Err(err) => {
                if !self.tree.borrow_mut().set_failed(key, generation) {
                    debug!("[EXPAND] {} generation {} failed after being superseded: {}", key, generation, err);
                    return ToggleOutcome::Superseded;
                }
                warn!("[EXPAND] {} failed: {}", key, err);
                if err.is_connectivity() {
                    self.connectivity.listing_failed();
                }
                self.sink.toast(Notice::error(err.user_message()));
                self.sink.rerender(key);
                ToggleOutcome::Failed(err)
            }
        }
    }

    async fn fetch(&self, key: NodeKey) -> BrowserResult<ChildList> {
        let backend = self.binder.bind_foreground().await.ok_or(BrowserError::BindTimeout {
            waited_ms: self.binder.foreground_timeout().as_millis() as u64,
        })?;

        match key {
            NodeKey::Root => backend
                .list_collections()
                .await
                .map(ChildList::Collections)
                .map_err(|e| BrowserError::from_backend("list_collections", e)),
            NodeKey::Collection(id) => backend
                .list_subcollections(id)
                .await
                .map(ChildList::SubCollections)
                .map_err(|e| BrowserError::from_backend("list_subcollections", e)),
            NodeKey::SubCollection(id) => backend
                .list_items(id)
                .await
                .map(ChildList::Items)
                .map_err(|e| BrowserError::from_backend("list_items", e)),
        }
    }
}
