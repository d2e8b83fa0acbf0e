//! Export Command

use serde::Serialize;

use super::call;
use crate::backend::OpResult;
use crate::error::BackendResult;
use crate::models::CollectionId;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportArgs<'a> {
    collection_id: CollectionId,
    /// Omitted when blank so the backend picks the name
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
}

pub async fn build_export(collection_id: CollectionId, filename: &str) -> BackendResult<OpResult> {
    let filename = Some(filename).filter(|f| !f.is_empty());
    call("build_export", &ExportArgs { collection_id, filename }).await
}
