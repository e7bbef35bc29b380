//! File attachment models.

use inventory_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `item_files` table. The bytes live in the blob store
/// under `storage_key`, which is never exposed to clients.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItemFile {
    pub id: DbId,
    pub item_id: DbId,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    #[serde(skip_serializing)]
    pub storage_key: String,
    pub created_at: Timestamp,
}

/// Metadata for a file whose bytes have already been written to the blob store.
#[derive(Debug, Clone)]
pub struct NewItemFile {
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub sha256: String,
    pub storage_key: String,
}
