//! Item Commands
//!
//! Items travel as `[id, content]` pairs or `{id, raw_md}` records depending
//! on the backend version; both are normalized here.

use serde::Serialize;

use super::call;
use crate::backend::OpResult;
use crate::error::BackendResult;
use crate::models::{items_from_wire, Item, ItemId, SubCollectionId, WireRow};

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubCollectionIdArgs {
    sub_collection_id: SubCollectionId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateArgs<'a> {
    content: &'a str,
    sub_collection_id: SubCollectionId,
}

#[derive(Serialize)]
struct UpdateArgs<'a> {
    id: ItemId,
    content: &'a str,
}

#[derive(Serialize)]
struct IdArgs {
    id: ItemId,
}

// ========================
// Commands
// ========================

pub async fn list_items(sub_collection_id: SubCollectionId) -> BackendResult<Vec<Item>> {
    let rows: Option<Vec<WireRow>> = call("list_items", &SubCollectionIdArgs { sub_collection_id }).await?;
    Ok(items_from_wire(sub_collection_id, rows))
}

pub async fn create_item(content: &str, sub_collection_id: SubCollectionId) -> BackendResult<OpResult> {
    call("create_item", &CreateArgs { content, sub_collection_id }).await
}

pub async fn update_item(id: ItemId, content: &str) -> BackendResult<OpResult> {
    call("update_item", &UpdateArgs { id, content }).await
}

pub async fn delete_item(id: ItemId) -> BackendResult<OpResult> {
    call("delete_item", &IdArgs { id }).await
}
