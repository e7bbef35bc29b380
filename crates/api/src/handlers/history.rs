//! Handlers for reading the history ledger.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use inventory_core::history::ActionType;
use inventory_core::types::DbId;
use inventory_db::models::history::HistoryQuery;
use inventory_db::repositories::HistoryRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/items/history
///
/// Ledger entries, newest first. Filters: `item_id`, `action_type`
/// (`CREATED`, `MOVED`, `DELETED`), and `limit`/`offset` pagination.
pub async fn list_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> AppResult<impl IntoResponse> {
    let action = params
        .action_type
        .as_deref()
        .map(ActionType::from_str)
        .transpose()?;

    let entries =
        HistoryRepo::list(&state.pool, params.item_id, action, params.limit, params.offset)
            .await?;

    Ok(Json(DataResponse { data: entries }))
}

/// GET /api/v1/items/{id}/history
///
/// Every entry still linked to the item, newest first. Entries of a deleted
/// item are unlinked and only reachable through the global listing.
pub async fn item_history(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let entries = HistoryRepo::list_for_item(&state.pool, id).await?;

    Ok(Json(DataResponse { data: entries }))
}
