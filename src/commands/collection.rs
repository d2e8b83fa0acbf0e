//! Collection Commands

use serde::Serialize;

use super::{call, NoArgs};
use crate::backend::OpResult;
use crate::error::BackendResult;
use crate::models::{collections_from_wire, Collection, CollectionId, WireRow};

// ========================
// Argument Structs
// ========================

#[derive(Serialize)]
struct IdArgs {
    id: CollectionId,
}

#[derive(Serialize)]
struct NameArgs<'a> {
    name: &'a str,
}

// ========================
// Commands
// ========================

pub async fn list_collections() -> BackendResult<Vec<Collection>> {
    let rows: Option<Vec<WireRow>> = call("list_collections", &NoArgs {}).await?;
    Ok(collections_from_wire(rows))
}

pub async fn get_collection(id: CollectionId) -> BackendResult<Option<Collection>> {
    let row: Option<WireRow> = call("get_collection", &IdArgs { id }).await?;
    Ok(row.map(|row| {
        let (id, name) = row.into_parts();
        Collection { id: CollectionId(id), name }
    }))
}

pub async fn create_collection(name: &str) -> BackendResult<OpResult> {
    call("create_collection", &NameArgs { name }).await
}

pub async fn delete_collection(id: CollectionId) -> BackendResult<OpResult> {
    call("delete_collection", &IdArgs { id }).await
}
