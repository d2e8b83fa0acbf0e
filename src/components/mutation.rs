//! Mutation Coordinator
//!
//! Create / update / delete for all three levels. Each operation runs the
//! same pipeline: validate, confirm (deletes only), bind, call, check the
//! result, then refresh the smallest part of the tree that changed. Ids of
//! created entities are only learned from the refresh.

use std::rc::Rc;

use log::{debug, info, warn};

use crate::backend::{BackendHandle, OpResult};
use crate::components::binder::BackendBinder;
use crate::components::confirm_gate::ConfirmationGate;
use crate::components::connectivity::ConnectivityReporter;
use crate::components::expansion::ExpansionController;
use crate::context::{Notice, ViewSink};
use crate::error::{BackendResult, BrowserError, BrowserResult};
use crate::models::{CollectionId, EntityRef, ItemId, NodeKey, SubCollectionId};
use crate::tree::SharedTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// The user declined the confirmation prompt
    Cancelled,
}

pub struct MutationCoordinator {
    tree: SharedTree,
    binder: Rc<BackendBinder>,
    expansion: Rc<ExpansionController>,
    gate: Rc<ConfirmationGate>,
    connectivity: Rc<ConnectivityReporter>,
    sink: Rc<dyn ViewSink>,
}

impl MutationCoordinator {
    pub fn new(
        tree: SharedTree,
        binder: Rc<BackendBinder>,
        expansion: Rc<ExpansionController>,
        gate: Rc<ConfirmationGate>,
        connectivity: Rc<ConnectivityReporter>,
        sink: Rc<dyn ViewSink>,
    ) -> Self {
        Self { tree, binder, expansion, gate, connectivity, sink }
    }

    // ========================
    // Create / update
    // ========================

    pub async fn create_collection(&self, name: &str) -> BrowserResult<MutationOutcome> {
        let result = async {
            let name = required(name, "Collection name")?;
            let backend = self.bind().await?;
            self.check("create_collection", backend.create_collection(name).await)?;

            info!("[MUTATE] created collection \"{}\"", name);
            self.expansion.refresh(NodeKey::Root).await;
            Ok::<_, BrowserError>(format!("Collection \"{}\" created", name))
        }
        .await;
        self.finish(result)
    }

    pub async fn create_subcollection(&self, name: &str, collection_id: CollectionId) -> BrowserResult<MutationOutcome> {
        let result = async {
            let name = required(name, "Sub-collection name")?;
            let parent = NodeKey::Collection(collection_id);
            if !self.tree.borrow().knows(parent) {
                return Err(BrowserError::Validation(format!("Unknown collection {}", collection_id)));
            }
            let backend = self.bind().await?;
            self.check("create_subcollection", backend.create_subcollection(name, collection_id).await)?;

            info!("[MUTATE] created sub-collection \"{}\" in {}", name, parent);
            self.expansion.refresh(parent).await;
            Ok::<_, BrowserError>(format!("Sub-collection \"{}\" created", name))
        }
        .await;
        self.finish(result)
    }

    pub async fn create_item(&self, content: &str, sub_collection_id: SubCollectionId) -> BrowserResult<MutationOutcome> {
        let result = async {
            let content = required(content, "Item content")?;
            let collection_id = self
                .tree
                .borrow()
                .sub_collection(sub_collection_id)
                .map(|s| s.collection_id)
                .ok_or_else(|| BrowserError::Validation(format!("Unknown sub-collection {}", sub_collection_id)))?;
            let backend = self.bind().await?;
            self.check("create_item", backend.create_item(content, sub_collection_id).await)?;

            info!("[MUTATE] created item in sub-collection {}", sub_collection_id);
            self.refresh_items(sub_collection_id, collection_id).await;
            Ok::<_, BrowserError>("Item created".to_string())
        }
        .await;
        self.finish(result)
    }

    pub async fn update_item(&self, id: ItemId, content: &str) -> BrowserResult<MutationOutcome> {
        let result = async {
            let content = required(content, "Item content")?;
            let (sub_collection_id, collection_id) = self
                .item_parents(id)
                .ok_or_else(|| BrowserError::Validation(format!("Unknown item {}", id)))?;
            let backend = self.bind().await?;
            self.check("update_item", backend.update_item(id, content).await)?;

            info!("[MUTATE] updated item {}", id);
            self.refresh_items(sub_collection_id, collection_id).await;
            Ok::<_, BrowserError>("Item updated".to_string())
        }
        .await;
        self.finish(result)
    }

    // ========================
    // Delete (confirmed)
    // ========================

    pub async fn delete_collection(&self, id: CollectionId) -> BrowserResult<MutationOutcome> {
        let result = async {
            let name = self
                .tree
                .borrow()
                .collection(id)
                .map(|c| c.name.clone())
                .ok_or_else(|| BrowserError::Validation(format!("Unknown collection {}", id)))?;
            let message = format!("Delete collection \"{}\" with all its sub-collections and items?", name);
            if !self.confirm("Delete collection", &message).await {
                return Ok(None);
            }
            let backend = self.bind().await?;
            self.check("delete_collection", backend.delete_collection(id).await)?;

            info!("[MUTATE] deleted collection {}", id);
            self.tree.borrow_mut().remove_entity(EntityRef::Collection(id));
            self.sink.rerender(NodeKey::Root);
            self.expansion.refresh(NodeKey::Root).await;
            Ok::<_, BrowserError>(Some(format!("Collection \"{}\" deleted", name)))
        }
        .await;
        self.finish_confirmed(result)
    }

    pub async fn delete_subcollection(&self, id: SubCollectionId) -> BrowserResult<MutationOutcome> {
        let result = async {
            let (name, collection_id) = self
                .tree
                .borrow()
                .sub_collection(id)
                .map(|s| (s.name.clone(), s.collection_id))
                .ok_or_else(|| BrowserError::Validation(format!("Unknown sub-collection {}", id)))?;
            let message = format!("Delete sub-collection \"{}\" and its items?", name);
            if !self.confirm("Delete sub-collection", &message).await {
                return Ok(None);
            }
            let backend = self.bind().await?;
            self.check("delete_subcollection", backend.delete_subcollection(id).await)?;

            info!("[MUTATE] deleted sub-collection {}", id);
            let parent = NodeKey::Collection(collection_id);
            self.tree.borrow_mut().remove_entity(EntityRef::SubCollection(id));
            self.sink.rerender(parent);
            self.expansion.refresh(parent).await;
            Ok::<_, BrowserError>(Some(format!("Sub-collection \"{}\" deleted", name)))
        }
        .await;
        self.finish_confirmed(result)
    }

    pub async fn delete_item(&self, id: ItemId) -> BrowserResult<MutationOutcome> {
        let result = async {
            let (sub_collection_id, collection_id) = self
                .item_parents(id)
                .ok_or_else(|| BrowserError::Validation(format!("Unknown item {}", id)))?;
            if !self.confirm("Delete item", "Delete this item?").await {
                return Ok(None);
            }
            let backend = self.bind().await?;
            self.check("delete_item", backend.delete_item(id).await)?;

            info!("[MUTATE] deleted item {}", id);
            self.tree.borrow_mut().remove_entity(EntityRef::Item(id));
            self.sink.rerender(NodeKey::SubCollection(sub_collection_id));
            self.refresh_items(sub_collection_id, collection_id).await;
            Ok::<_, BrowserError>(Some("Item deleted".to_string()))
        }
        .await;
        self.finish_confirmed(result)
    }

    // ========================
    // Pipeline steps
    // ========================

    async fn bind(&self) -> BrowserResult<BackendHandle> {
        self.binder.bind_foreground().await.ok_or(BrowserError::BindTimeout {
            waited_ms: self.binder.foreground_timeout().as_millis() as u64,
        })
    }

    async fn confirm(&self, title: &str, message: &str) -> bool {
        let affirmed = self.gate.ask(title, message).await;
        if !affirmed {
            info!("[MUTATE] {} cancelled", title.to_lowercase());
        }
        affirmed
    }

    fn check(&self, operation: &'static str, result: BackendResult<OpResult>) -> BrowserResult<OpResult> {
        let checked = result
            .map_err(|e| BrowserError::from_backend(operation, e))
            .and_then(|res| res.checked(operation));
        if let Err(err) = &checked {
            if err.is_connectivity() {
                self.connectivity.mutation_failed();
            }
        }
        checked
    }

    fn item_parents(&self, id: ItemId) -> Option<(SubCollectionId, CollectionId)> {
        let tree = self.tree.borrow();
        let sub_collection_id = tree.item(id)?.sub_collection_id;
        let collection_id = tree.sub_collection(sub_collection_id)?.collection_id;
        Some((sub_collection_id, collection_id))
    }

    /// Items changed: refresh the sub-collection, counts on the collection changed too
    async fn refresh_items(&self, sub_collection_id: SubCollectionId, collection_id: CollectionId) {
        self.expansion.refresh(NodeKey::SubCollection(sub_collection_id)).await;
        self.sink.rerender(NodeKey::Collection(collection_id));
    }

    fn finish(&self, result: BrowserResult<String>) -> BrowserResult<MutationOutcome> {
        self.finish_confirmed(result.map(Some))
    }

    fn finish_confirmed(&self, result: BrowserResult<Option<String>>) -> BrowserResult<MutationOutcome> {
        match result {
            Ok(Some(done)) => {
                self.sink.toast(Notice::info(done));
                Ok(MutationOutcome::Applied)
            }
            Ok(None) => Ok(MutationOutcome::Cancelled),
            Err(err) => {
                match &err {
                    BrowserError::Validation(_) => debug!("[MUTATE] rejected input: {}", err),
                    _ => warn!("[MUTATE] {}", err),
                }
                self.sink.toast(Notice::error(err.user_message()));
                Err(err)
            }
        }
    }
}

/// Trimmed, non-empty text
fn required<'a>(text: &'a str, what: &str) -> BrowserResult<&'a str> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(BrowserError::Validation(format!("{} cannot be empty", what)));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_trims() {
        assert_eq!(required("  Algebra \n", "Collection name").unwrap(), "Algebra");
        let err = required(" \t", "Collection name").unwrap_err();
        assert_eq!(err.user_message(), "Collection name cannot be empty");
    }
}
