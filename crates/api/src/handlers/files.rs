//! Handlers for file attachments.
//!
//! Uploads are written to the blob store first and recorded second; if the
//! metadata insert fails the blob is removed again.

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use inventory_core::attachments::{
    normalize_content_type, sanitize_file_name, sha256_hex, validate_file, FAMILY_FILE,
    MAX_FILE_NAME_LENGTH,
};
use inventory_core::error::CoreError;
use inventory_core::storage::storage_key;
use inventory_core::types::DbId;
use inventory_db::models::file::NewItemFile;
use inventory_db::repositories::FileRepo;

use crate::error::{AppError, AppResult};
use crate::handlers::items::ensure_item_exists;
use crate::handlers::purge_blobs;
use crate::response::DataResponse;
use crate::state::AppState;

/// Content type assumed when the upload does not declare one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// GET /api/v1/items/{id}/files
pub async fn list_files(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_item_exists(&state, item_id).await?;
    let files = FileRepo::list_for_item(&state.pool, item_id).await?;

    Ok(Json(DataResponse { data: files }))
}

/// POST /api/v1/items/{id}/files
///
/// Accepts a multipart form with a required `file` field.
pub async fn upload_file(
    State(state): State<AppState>,
    Path(item_id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let mut upload: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((file_name, content_type, data.to_vec()));
    }

    let (file_name, content_type, data) =
        upload.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;

    validate_file(&content_type, data.len() as u64, state.config.max_upload_bytes)?;
    ensure_item_exists(&state, item_id).await?;

    let original_name: String = file_name.chars().take(MAX_FILE_NAME_LENGTH).collect();
    let key = storage_key(item_id, &original_name);
    state.blobs.put(&key, &data).await?;

    let input = NewItemFile {
        original_name,
        content_type: normalize_content_type(&content_type),
        size_bytes: data.len() as i64,
        sha256: sha256_hex(&data),
        storage_key: key,
    };

    let file = match FileRepo::create(&state.pool, item_id, &input).await {
        Ok(file) => file,
        Err(e) => {
            purge_blobs(&state, std::slice::from_ref(&input.storage_key)).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        item_id,
        file_id = file.id,
        size_bytes = file.size_bytes,
        family = FAMILY_FILE,
        "Attachment added",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: file })))
}

/// GET /api/v1/items/{id}/files/{file_id}
///
/// Streams the stored bytes back with the recorded content type.
pub async fn download_file(
    State(state): State<AppState>,
    Path((item_id, file_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let file = FileRepo::find(&state.pool, item_id, file_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: FAMILY_FILE,
            id: file_id,
        }))?;

    let data = state.blobs.get(&file.storage_key).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_file_name(&file.original_name)
    );

    Ok((
        StatusCode::OK,
        [(CONTENT_TYPE, file.content_type), (CONTENT_DISPOSITION, disposition)],
        data,
    ))
}

/// DELETE /api/v1/items/{id}/files/{file_id}
pub async fn delete_file(
    State(state): State<AppState>,
    Path((item_id, file_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let file = FileRepo::delete(&state.pool, item_id, file_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: FAMILY_FILE,
            id: file_id,
        }))?;

    purge_blobs(&state, std::slice::from_ref(&file.storage_key)).await;

    tracing::info!(item_id, file_id, family = FAMILY_FILE, "Attachment removed");

    Ok(StatusCode::NO_CONTENT)
}
