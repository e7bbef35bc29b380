use std::sync::Arc;

use inventory_core::storage::BlobStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: inventory_db::DbPool,
    /// Server configuration (delete policy, upload limits).
    pub config: Arc<ServerConfig>,
    /// Storage backend for file attachment bytes.
    pub blobs: Arc<dyn BlobStore>,
}
