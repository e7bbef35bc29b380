//! Handlers for the inventory tree: listing, search, detail, and the
//! structural mutations (create, move, delete).

use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use inventory_core::error::CoreError;
use inventory_core::search::{contains_pattern, normalize_query};
use inventory_core::tree::{render, sort_by_depth, RenderMode, TreeIndex, TreeNode};
use inventory_core::types::DbId;
use inventory_db::models::item::{
    CreateItem, ItemDetail, ItemListParams, ItemListing, ItemPath, ItemSearchParams, MoveItem,
    UpdateItem,
};
use inventory_db::repositories::{
    CodeRepo, EmailRepo, FileRepo, HistoryRepo, ItemRepo, NoteRepo,
};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::handlers::purge_blobs;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Listing and search
// ---------------------------------------------------------------------------

/// GET /api/v1/items
///
/// Hierarchical by default: the roots, each carrying its nested children.
/// With `?hierarchical=false`, every item once with empty `children`.
pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemListParams>,
) -> AppResult<impl IntoResponse> {
    let all = ItemRepo::list_all(&state.pool).await?;
    let index = TreeIndex::new(&all);
    let mode = RenderMode::from_hierarchical(params.hierarchical);

    let ids: Vec<DbId> = match mode {
        RenderMode::Hierarchical => index.root_ids(),
        RenderMode::Flat => all.iter().map(|l| l.item.id).collect(),
    };
    let nodes = render(&index, &ids, mode, &mut HashSet::new());

    Ok(Json(DataResponse { data: nodes }))
}

/// GET /api/v1/items/search?q=
///
/// Matches name and description by substring, QR code and attached codes
/// exactly (all case-insensitive). A blank query returns no results.
///
/// Hierarchical results list each hit with its subtree; a hit already shown
/// inside an earlier hit's subtree is not repeated at top level.
pub async fn search_items(
    State(state): State<AppState>,
    Query(params): Query<ItemSearchParams>,
) -> AppResult<impl IntoResponse> {
    let Some(term) = normalize_query(&params.q)? else {
        return Ok(Json(DataResponse {
            data: Vec::<TreeNode<ItemListing>>::new(),
        }));
    };

    let hits = ItemRepo::search(&state.pool, &term, &contains_pattern(&term)).await?;
    if hits.is_empty() {
        return Ok(Json(DataResponse { data: Vec::new() }));
    }

    // Paths and subtrees need the whole tree, not just the hits.
    let all = ItemRepo::list_all(&state.pool).await?;
    let index = TreeIndex::new(&all);
    let mode = RenderMode::from_hierarchical(params.hierarchical);

    let mut ids: Vec<DbId> = hits.iter().map(|l| l.item.id).collect();
    if mode == RenderMode::Hierarchical {
        sort_by_depth(&index, &mut ids);
    }
    let nodes = render(&index, &ids, mode, &mut HashSet::new());

    tracing::debug!(query = %term, hits = hits.len(), "Item search");

    Ok(Json(DataResponse { data: nodes }))
}

// ---------------------------------------------------------------------------
// Single item
// ---------------------------------------------------------------------------

/// GET /api/v1/items/{id}
///
/// The item with its subtree, full path, attachments, and history, all read
/// from one snapshot.
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let mut tx = inventory_db::begin_snapshot(&state.pool).await?;

    let subtree = ItemRepo::subtree(&mut *tx, id).await?;
    if subtree.is_empty() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Item", id }));
    }

    // Ancestors above the item give it the right level and path.
    let mut records: Vec<ItemListing> = ItemRepo::ancestors(&mut *tx, id)
        .await?
        .into_iter()
        .filter(|l| l.item.id != id)
        .collect();
    records.extend(subtree);

    let index = TreeIndex::new(&records);
    let node = render(&index, &[id], RenderMode::Hierarchical, &mut HashSet::new())
        .into_iter()
        .next()
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Item", id }))?;

    let detail = ItemDetail {
        node,
        notes: NoteRepo::list_for_item(&mut *tx, id).await?,
        files: FileRepo::list_for_item(&mut *tx, id).await?,
        emails: EmailRepo::list_for_item(&mut *tx, id).await?,
        codes: CodeRepo::list_for_item(&mut *tx, id).await?,
        history: HistoryRepo::list_for_item(&mut *tx, id).await?,
    };
    tx.commit().await?;

    Ok(Json(DataResponse { data: detail }))
}

/// GET /api/v1/items/{id}/path
///
/// The ancestor chain, root first, and the joined path string.
pub async fn get_item_path(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let items = ItemRepo::ancestors(&state.pool, id).await?;
    if items.is_empty() {
        return Err(AppError::Core(CoreError::NotFound { entity: "Item", id }));
    }

    let full_path = TreeIndex::new(&items).full_path(id);

    Ok(Json(DataResponse {
        data: ItemPath { items, full_path },
    }))
}

/// GET /api/v1/items/{id}/siblings
///
/// Items sharing this item's parent, the item itself excluded.
pub async fn list_siblings(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_item_exists(&state, id).await?;
    let siblings = ItemRepo::siblings(&state.pool, id).await?;

    Ok(Json(DataResponse { data: siblings }))
}

// ---------------------------------------------------------------------------
// Mutations
// ---------------------------------------------------------------------------

/// POST /api/v1/items
pub async fn create_item(
    State(state): State<AppState>,
    Json(input): Json<CreateItem>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let item = ItemRepo::create(&state.pool, &input).await?;

    tracing::info!(item_id = item.id, parent_id = ?item.parent_id, "Item created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: item })))
}

/// PUT|PATCH /api/v1/items/{id}
///
/// Edit name, description, or QR code. Does not re-parent.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateItem>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let item = ItemRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Item", id }))?;

    tracing::info!(item_id = id, "Item updated");

    Ok(Json(DataResponse { data: item }))
}

/// POST /api/v1/items/{id}/move, PUT /api/v1/items/{id}/parent
///
/// Re-parent an item; `new_parent_id: null` moves it to root.
pub async fn move_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveItem>,
) -> AppResult<impl IntoResponse> {
    let item = ItemRepo::move_item(&state.pool, id, input.new_parent_id).await?;

    tracing::info!(item_id = id, new_parent_id = ?input.new_parent_id, "Item moved");

    Ok(Json(DataResponse { data: item }))
}

/// DELETE /api/v1/items/{id}
///
/// Applies the configured delete policy and reports what was removed or
/// re-rooted. File blobs of removed items are purged after the commit.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let policy = state.config.delete_policy;
    let outcome = ItemRepo::delete(&state.pool, id, policy).await?;

    purge_blobs(&state, &outcome.storage_keys).await;

    tracing::info!(
        item_id = id,
        policy = policy.as_str(),
        deleted = outcome.deleted_ids.len(),
        orphaned = outcome.orphaned_ids.len(),
        "Item deleted",
    );

    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fail with `NotFound` unless the item exists.
pub(crate) async fn ensure_item_exists(state: &AppState, id: DbId) -> AppResult<()> {
    ItemRepo::find_by_id(&state.pool, id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Item", id }))
}
