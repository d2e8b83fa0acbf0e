//! Resource Browser
//!
//! Wires the components around one shared tree and exposes the entry points
//! the view calls: startup, the collection list, per-collection summaries,
//! lookups for the routing glue and export requests.

use std::rc::Rc;

use log::{debug, info, warn};

use crate::backend::BackendHandle;
use crate::components::{
    BackendBinder, ConfirmationGate, ConnectivityReporter, ExpansionController, MutationCoordinator, ReadinessSlot,
    ToggleOutcome,
};
use crate::config::BrowserConfig;
use crate::context::{Notice, ViewSink};
use crate::error::{BrowserError, BrowserResult};
use crate::models::{Collection, CollectionId, NodeKey};
use crate::platform::spawn_local;
use crate::tree::{ResourceTree, SharedTree};

/// Descendant counts shown on a collection card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionSummary {
    pub sub_collections: usize,
    pub items: usize,
    /// Some item listings failed and were left out of `items`
    pub partial: bool,
}

pub struct ResourceBrowser {
    config: BrowserConfig,
    tree: SharedTree,
    sink: Rc<dyn ViewSink>,
    connectivity: Rc<ConnectivityReporter>,
    binder: Rc<BackendBinder>,
    gate: Rc<ConfirmationGate>,
    expansion: Rc<ExpansionController>,
    mutations: Rc<MutationCoordinator>,
}

impl ResourceBrowser {
    pub fn new(config: BrowserConfig, slot: Rc<dyn ReadinessSlot>, sink: Rc<dyn ViewSink>) -> Self {
        let tree = ResourceTree::shared();
        let connectivity = Rc::new(ConnectivityReporter::new(sink.clone()));
        let binder = Rc::new(BackendBinder::new(slot, &config, connectivity.clone()));
        let gate = Rc::new(ConfirmationGate::new(sink.clone()));
        let expansion = Rc::new(ExpansionController::new(
            tree.clone(),
            binder.clone(),
            connectivity.clone(),
            sink.clone(),
        ));
        let mutations = Rc::new(MutationCoordinator::new(
            tree.clone(),
            binder.clone(),
            expansion.clone(),
            gate.clone(),
            connectivity.clone(),
            sink.clone(),
        ));

        Self { config, tree, sink, connectivity, binder, gate, expansion, mutations }
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    pub fn tree(&self) -> SharedTree {
        self.tree.clone()
    }

    pub fn connectivity(&self) -> &Rc<ConnectivityReporter> {
        &self.connectivity
    }

    pub fn binder(&self) -> &Rc<BackendBinder> {
        &self.binder
    }

    pub fn gate(&self) -> &Rc<ConfirmationGate> {
        &self.gate
    }

    pub fn expansion(&self) -> &Rc<ExpansionController> {
        &self.expansion
    }

    pub fn mutations(&self) -> &Rc<MutationCoordinator> {
        &self.mutations
    }

    /// Issue the background rebind, then load the collection list. A late
    /// backend found by the rebind triggers another full reload.
    pub async fn start(&self) -> ToggleOutcome {
        info!("[APP] starting");
        let expansion = self.expansion.clone();
        self.binder.spawn_background_rebind(move |_| {
            spawn_local(async move {
                info!("[APP] backend came up late, reloading collections");
                expansion.load_root().await;
            });
        });
        self.refresh_collections().await
    }

    /// Full reload of the collection list
    pub async fn refresh_collections(&self) -> ToggleOutcome {
        info!("[APP] Loading collections...");
        self.expansion.load_root().await
    }

    /// Count sub-collections and items with ancillary fetches. Item listings
    /// that fail are skipped and mark the summary partial.
    pub async fn collection_summary(&self, id: CollectionId) -> BrowserResult<CollectionSummary> {
        let backend = self.bind().await?;
        let subs = backend.list_subcollections(id).await.map_err(|e| {
            self.connectivity.ancillary_failed("list_subcollections");
            BrowserError::from_backend("list_subcollections", e)
        })?;

        let mut summary = CollectionSummary { sub_collections: subs.len(), ..Default::default() };
        for sub in &subs {
            match backend.list_items(sub.id).await {
                Ok(items) => summary.items += items.len(),
                Err(err) => {
                    debug!("[APP] item count for sub-collection {} unavailable: {}", sub.id, err);
                    self.connectivity.ancillary_failed("list_items");
                    summary.partial = true;
                }
            }
        }
        Ok(summary)
    }

    /// Look a collection up by id; `None` if the backend does not know it
    pub async fn fetch_collection(&self, id: CollectionId) -> BrowserResult<Option<Collection>> {
        let backend = self.bind().await?;
        match backend.get_collection(id).await {
            Ok(found) => {
                self.connectivity.listing_succeeded();
                Ok(found)
            }
            Err(err) => {
                let err = BrowserError::from_backend("get_collection", err);
                if err.is_connectivity() {
                    self.connectivity.listing_failed();
                }
                Err(err)
            }
        }
    }

    /// Loaded collections matching `query`
    pub fn filter_collections(&self, query: &str) -> Vec<Collection> {
        self.tree.borrow().filter_collections(query)
    }

    /// Ask the backend to build the export document and return its path.
    /// A blank filename leaves naming to the backend.
    pub async fn export_collection(&self, id: CollectionId, filename: &str) -> BrowserResult<String> {
        let result = async {
            if !self.tree.borrow().knows(NodeKey::Collection(id)) {
                return Err(BrowserError::Validation(format!("Unknown collection {}", id)));
            }
            let backend = self.bind().await?;
            let res = backend.build_export(id, filename.trim()).await.map_err(|e| {
                let err = BrowserError::from_backend("build_export", e);
                if err.is_connectivity() {
                    self.connectivity.mutation_failed();
                }
                err
            })?;
            res.checked("build_export")?
                .path
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| BrowserError::InvalidResult {
                    operation: "build_export",
                    message: "Export finished without a file path".to_string(),
                })
        }
        .await;

        match &result {
            Ok(path) => {
                info!("[APP] exported collection {} to {}", id, path);
                self.sink.toast(Notice::info(format!("Exported to {}", path)));
            }
            Err(err) => {
                warn!("[APP] export of collection {} failed: {}", id, err);
                self.sink.toast(Notice::error(err.user_message()));
            }
        }
        result
    }

    async fn bind(&self) -> BrowserResult<BackendHandle> {
        self.binder.bind_foreground().await.ok_or(BrowserError::BindTimeout {
            waited_ms: self.binder.foreground_timeout().as_millis() as u64,
        })
    }
}
