//! Sub-collection Commands

use serde::Serialize;

use super::call;
use crate::backend::OpResult;
use crate::error::BackendResult;
use crate::models::{sub_collections_from_wire, CollectionId, SubCollection, SubCollectionId, WireRow};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionIdArgs {
    collection_id: CollectionId,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateArgs<'a> {
    name: &'a str,
    collection_id: CollectionId,
}

#[derive(Serialize)]
struct IdArgs {
    id: SubCollectionId,
}

pub async fn list_subcollections(collection_id: CollectionId) -> BackendResult<Vec<SubCollection>> {
    let rows: Option<Vec<WireRow>> = call("list_subcollections", &CollectionIdArgs { collection_id }).await?;
    Ok(sub_collections_from_wire(collection_id, rows))
}

pub async fn create_subcollection(name: &str, collection_id: CollectionId) -> BackendResult<OpResult> {
    call("create_subcollection", &CreateArgs { name, collection_id }).await
}

pub async fn delete_subcollection(id: SubCollectionId) -> BackendResult<OpResult> {
    call("delete_subcollection", &IdArgs { id }).await
}
