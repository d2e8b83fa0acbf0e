//! Backend Capability
//!
//! The operations the controller depends on but does not implement.
//! Implementations normalize wire shapes before returning.

use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{BackendResult, BrowserError, BrowserResult};
use crate::models::{Collection, CollectionId, Item, ItemId, SubCollection, SubCollectionId};

/// Shared handle to a bound backend
pub type BackendHandle = Rc<dyn Backend>;

/// Result object returned by mutating calls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl OpResult {
    pub fn ok() -> Self {
        Self { success: true, ..Default::default() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: Some(message.into()), path: None }
    }

    /// Message, if present and not blank
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    /// Accept a successful result, otherwise report the backend's message or
    /// a generic fallback
    pub fn checked(self, operation: &'static str) -> BrowserResult<Self> {
        if self.success {
            return Ok(self);
        }
        match self.message() {
            Some(message) => Err(BrowserError::CallFailure { operation, message: message.to_string(), transport: false }),
            None => Err(BrowserError::InvalidResult { operation, message: "Operation failed".to_string() }),
        }
    }
}

/// Backend capability surface.
///
/// All calls are single-threaded suspension points (`?Send`).
#[async_trait(?Send)]
pub trait Backend {
    async fn list_collections(&self) -> BackendResult<Vec<Collection>>;

    async fn get_collection(&self, id: CollectionId) -> BackendResult<Option<Collection>>;

    async fn list_subcollections(&self, collection_id: CollectionId) -> BackendResult<Vec<SubCollection>>;

    async fn list_items(&self, sub_collection_id: SubCollectionId) -> BackendResult<Vec<Item>>;

    async fn create_collection(&self, name: &str) -> BackendResult<OpResult>;

    async fn create_subcollection(&self, name: &str, collection_id: CollectionId) -> BackendResult<OpResult>;

    async fn create_item(&self, content: &str, sub_collection_id: SubCollectionId) -> BackendResult<OpResult>;

    async fn update_item(&self, id: ItemId, content: &str) -> BackendResult<OpResult>;

    async fn delete_collection(&self, id: CollectionId) -> BackendResult<OpResult>;

    async fn delete_subcollection(&self, id: SubCollectionId) -> BackendResult<OpResult>;

    async fn delete_item(&self, id: ItemId) -> BackendResult<OpResult>;

    /// Ask the backend to build an export document; `path` is set on success
    async fn build_export(&self, collection_id: CollectionId, filename: &str) -> BackendResult<OpResult>;
}
