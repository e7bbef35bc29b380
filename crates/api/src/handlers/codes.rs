//! Handlers for item codes (serials, barcodes, part numbers).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use inventory_core::attachments::FAMILY_CODE;
use inventory_core::error::CoreError;
use inventory_core::types::DbId;
use inventory_db::models::code::CreateCode;
use inventory_db::repositories::CodeRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::items::ensure_item_exists;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/items/{id}/codes
pub async fn list_codes(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_item_exists(&state, item_id).await?;
    let codes = CodeRepo::list_for_item(&state.pool, item_id).await?;

    Ok(Json(DataResponse { data: codes }))
}

/// POST /api/v1/items/{id}/codes
///
/// A code already on the item (ignoring case) is rejected with 409.
pub async fn create_code(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(input): Json<CreateCode>,
) -> AppResult<impl IntoResponse> {
    let code = CodeRepo::create(&state.pool, item_id, &input).await?;

    tracing::info!(item_id, code_id = code.id, family = FAMILY_CODE, "Attachment added");

    Ok((StatusCode::CREATED, Json(DataResponse { data: code })))
}

/// DELETE /api/v1/items/{id}/codes/{code_id}
pub async fn delete_code(
    State(state): State<AppState>,
    Path((item_id, code_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !CodeRepo::delete(&state.pool, item_id, code_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: FAMILY_CODE,
            id: code_id,
        }));
    }

    tracing::info!(item_id, code_id, family = FAMILY_CODE, "Attachment removed");

    Ok(StatusCode::NO_CONTENT)
}
