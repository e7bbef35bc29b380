//! Repository for the `item_notes` table.

use inventory_core::attachments::{normalize_author, validate_note_content};
use inventory_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::error::StoreError;
use crate::models::note::{CreateNote, Note};
use crate::repositories::ItemRepo;

/// Column list for `item_notes` queries.
const COLUMNS: &str = "id, item_id, content, author, created_at";

/// Provides create, list, and delete for item notes.
pub struct NoteRepo;

impl NoteRepo {
    /// Add a note to an item. Fails with `NotFound` if the item does not exist.
    pub async fn create(
        pool: &PgPool,
        item_id: DbId,
        input: &CreateNote,
    ) -> Result<Note, StoreError> {
        validate_note_content(&input.content)?;
        let author = normalize_author(input.author.as_deref())?;

        let mut tx = pool.begin().await?;
        ItemRepo::lock_owner(&mut tx, item_id).await?;

        let query = format!(
            "INSERT INTO item_notes (item_id, content, author) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let note = sqlx::query_as::<_, Note>(&query)
            .bind(item_id)
            .bind(&input.content)
            .bind(&author)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(note)
    }

    /// List an item's notes, newest first.
    pub async fn list_for_item(
        executor: impl PgExecutor<'_>,
        item_id: DbId,
    ) -> Result<Vec<Note>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM item_notes WHERE item_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Note>(&query)
            .bind(item_id)
            .fetch_all(executor)
            .await
    }

    /// Delete a note. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, item_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM item_notes WHERE id = $1 AND item_id = $2")
            .bind(id)
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
