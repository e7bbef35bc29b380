pub mod codes;
pub mod emails;
pub mod files;
pub mod history;
pub mod items;
pub mod notes;

use crate::state::AppState;

/// Remove blobs whose metadata rows are already gone.
///
/// Runs after the owning transaction has committed, so a failure here only
/// leaves an unreferenced blob behind; it is logged and not surfaced.
pub(crate) async fn purge_blobs(state: &AppState, keys: &[String]) {
    for key in keys {
        if let Err(e) = state.blobs.delete(key).await {
            tracing::warn!(storage_key = %key, error = %e, "Failed to purge attachment blob");
        }
    }
}
