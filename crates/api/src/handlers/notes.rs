//! Handlers for item notes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use inventory_core::attachments::FAMILY_NOTE;
use inventory_core::error::CoreError;
use inventory_core::types::DbId;
use inventory_db::models::note::CreateNote;
use inventory_db::repositories::NoteRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::items::ensure_item_exists;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/items/{id}/notes
pub async fn list_notes(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_item_exists(&state, item_id).await?;
    let notes = NoteRepo::list_for_item(&state.pool, item_id).await?;

    Ok(Json(DataResponse { data: notes }))
}

/// POST /api/v1/items/{id}/notes
pub async fn create_note(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(input): Json<CreateNote>,
) -> AppResult<impl IntoResponse> {
    let note = NoteRepo::create(&state.pool, item_id, &input).await?;

    tracing::info!(item_id, note_id = note.id, family = FAMILY_NOTE, "Attachment added");

    Ok((StatusCode::CREATED, Json(DataResponse { data: note })))
}

/// DELETE /api/v1/items/{id}/notes/{note_id}
pub async fn delete_note(
    State(state): State<AppState>,
    Path((item_id, note_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !NoteRepo::delete(&state.pool, item_id, note_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: FAMILY_NOTE,
            id: note_id,
        }));
    }

    tracing::info!(item_id, note_id, family = FAMILY_NOTE, "Attachment removed");

    Ok(StatusCode::NO_CONTENT)
}
