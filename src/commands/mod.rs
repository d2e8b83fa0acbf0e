//! Tauri Command Wrappers
//!
//! Frontend bindings to backend commands, organized by level, plus the
//! `Backend` implementation and readiness slot built on them.

mod collection;
mod export;
mod item;
mod slot;
mod subcollection;

use std::rc::Rc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::backend::{Backend, OpResult};
use crate::error::{BackendError, BackendResult};
use crate::models::{Collection, CollectionId, Item, ItemId, SubCollection, SubCollectionId};

pub use slot::TauriSlot;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["window", "__TAURI__", "core"], catch)]
    async fn invoke(cmd: &str, args: JsValue) -> Result<JsValue, JsValue>;
}

#[derive(Serialize)]
struct NoArgs {}

/// Invoke `cmd` and decode its answer
async fn call<A, T>(cmd: &str, args: &A) -> BackendResult<T>
where
    A: Serialize,
    T: DeserializeOwned,
{
    let js_args = serde_wasm_bindgen::to_value(args).map_err(|e| BackendError::Malformed(e.to_string()))?;
    let result = invoke(cmd, js_args).await.map_err(rejection)?;
    serde_wasm_bindgen::from_value(result).map_err(|e| BackendError::Malformed(format!("{}: {}", cmd, e)))
}

/// Commands reject with their error string; anything else means the bridge failed
fn rejection(err: JsValue) -> BackendError {
    match err.as_string() {
        Some(message) => BackendError::Rejected(message),
        None => BackendError::Unavailable(format!("{:?}", err)),
    }
}

/// Backend reached through `window.__TAURI__.core.invoke`
pub struct TauriBackend;

impl TauriBackend {
    pub fn handle() -> Rc<dyn Backend> {
        Rc::new(TauriBackend)
    }
}

#[async_trait(?Send)]
impl Backend for TauriBackend {
    async fn list_collections(&self) -> BackendResult<Vec<Collection>> {
        collection::list_collections().await
    }

    async fn get_collection(&self, id: CollectionId) -> BackendResult<Option<Collection>> {
        collection::get_collection(id).await
    }

    async fn list_subcollections(&self, collection_id: CollectionId) -> BackendResult<Vec<SubCollection>> {
        subcollection::list_subcollections(collection_id).await
    }

    async fn list_items(&self, sub_collection_id: SubCollectionId) -> BackendResult<Vec<Item>> {
        item::list_items(sub_collection_id).await
    }

    async fn create_collection(&self, name: &str) -> BackendResult<OpResult> {
        collection::create_collection(name).await
    }

    async fn create_subcollection(&self, name: &str, collection_id: CollectionId) -> BackendResult<OpResult> {
        subcollection::create_subcollection(name, collection_id).await
    }

    async fn create_item(&self, content: &str, sub_collection_id: SubCollectionId) -> BackendResult<OpResult> {
        item::create_item(content, sub_collection_id).await
    }

    async fn update_item(&self, id: ItemId, content: &str) -> BackendResult<OpResult> {
        item::update_item(id, content).await
    }

    async fn delete_collection(&self, id: CollectionId) -> BackendResult<OpResult> {
        collection::delete_collection(id).await
    }

    async fn delete_subcollection(&self, id: SubCollectionId) -> BackendResult<OpResult> {
        subcollection::delete_subcollection(id).await
    }

    async fn delete_item(&self, id: ItemId) -> BackendResult<OpResult> {
        item::delete_item(id).await
    }

    async fn build_export(&self, collection_id: CollectionId, filename: &str) -> BackendResult<OpResult> {
        export::build_export(collection_id, filename).await
    }
}
