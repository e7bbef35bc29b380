//! Handlers for item emails.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use inventory_core::attachments::FAMILY_EMAIL;
use inventory_core::error::CoreError;
use inventory_core::types::DbId;
use inventory_db::models::email::CreateEmail;
use inventory_db::repositories::EmailRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::items::ensure_item_exists;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/items/{id}/emails
pub async fn list_emails(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_item_exists(&state, item_id).await?;
    let emails = EmailRepo::list_for_item(&state.pool, item_id).await?;

    Ok(Json(DataResponse { data: emails }))
}

/// POST /api/v1/items/{id}/emails
pub async fn create_email(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    Json(input): Json<CreateEmail>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let email = EmailRepo::create(&state.pool, item_id, &input).await?;

    tracing::info!(item_id, email_id = email.id, family = FAMILY_EMAIL, "Attachment added");

    Ok((StatusCode::CREATED, Json(DataResponse { data: email })))
}

/// DELETE /api/v1/items/{id}/emails/{email_id}
pub async fn delete_email(
    State(state): State<AppState>,
    Path((item_id, email_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !EmailRepo::delete(&state.pool, item_id, email_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: FAMILY_EMAIL,
            id: email_id,
        }));
    }

    tracing::info!(item_id, email_id, family = FAMILY_EMAIL, "Attachment removed");

    Ok(StatusCode::NO_CONTENT)
}
