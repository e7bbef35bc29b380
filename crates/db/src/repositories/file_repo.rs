//! Repository for the `item_files` table (file metadata only).

use inventory_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::error::StoreError;
use crate::models::file::{ItemFile, NewItemFile};
use crate::repositories::ItemRepo;

/// Column list for `item_files` queries.
const COLUMNS: &str = "\
    id, item_id, original_name, content_type, size_bytes, sha256, storage_key, created_at";

/// Provides create, lookup, list, and delete for file metadata.
pub struct FileRepo;

impl FileRepo {
    /// Record a stored file against an item.
    /// Fails with `NotFound` if the item does not exist.
    pub async fn create(
        pool: &PgPool,
        item_id: DbId,
        input: &NewItemFile,
    ) -> Result<ItemFile, StoreError> {
        let mut tx = pool.begin().await?;
        ItemRepo::lock_owner(&mut tx, item_id).await?;

        let query = format!(
            "INSERT INTO item_files \
                (item_id, original_name, content_type, size_bytes, sha256, storage_key) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let file = sqlx::query_as::<_, ItemFile>(&query)
            .bind(item_id)
            .bind(&input.original_name)
            .bind(&input.content_type)
            .bind(input.size_bytes)
            .bind(&input.sha256)
            .bind(&input.storage_key)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(file)
    }

    /// Find a file belonging to an item.
    pub async fn find(
        pool: &PgPool,
        item_id: DbId,
        id: DbId,
    ) -> Result<Option<ItemFile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM item_files WHERE id = $1 AND item_id = $2");
        sqlx::query_as::<_, ItemFile>(&query)
            .bind(id)
            .bind(item_id)
            .fetch_optional(pool)
            .await
    }

    /// List an item's files, newest first.
    pub async fn list_for_item(
        executor: impl PgExecutor<'_>,
        item_id: DbId,
    ) -> Result<Vec<ItemFile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM item_files WHERE item_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ItemFile>(&query)
            .bind(item_id)
            .fetch_all(executor)
            .await
    }

    /// Delete a file's metadata, returning the removed row so the caller
    /// can purge its blob.
    pub async fn delete(
        pool: &PgPool,
        item_id: DbId,
        id: DbId,
    ) -> Result<Option<ItemFile>, sqlx::Error> {
        let query = format!(
            "DELETE FROM item_files WHERE id = $1 AND item_id = $2 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ItemFile>(&query)
            .bind(id)
            .bind(item_id)
            .fetch_optional(pool)
            .await
    }
}
