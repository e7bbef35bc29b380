//! Repository for the `item_emails` table.

use inventory_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::error::StoreError;
use crate::models::email::{CreateEmail, Email};
use crate::repositories::ItemRepo;

/// Column list for `item_emails` queries.
const COLUMNS: &str = "\
    id, item_id, subject, body, from_address, received_at, processed, created_at";

/// Provides create, list, and delete for item emails.
pub struct EmailRepo;

impl EmailRepo {
    /// Attach an email to an item. Fails with `NotFound` if the item does not exist.
    pub async fn create(
        pool: &PgPool,
        item_id: DbId,
        input: &CreateEmail,
    ) -> Result<Email, StoreError> {
        let mut tx = pool.begin().await?;
        ItemRepo::lock_owner(&mut tx, item_id).await?;

        let query = format!(
            "INSERT INTO item_emails \
                (item_id, subject, body, from_address, received_at, processed) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let email = sqlx::query_as::<_, Email>(&query)
            .bind(item_id)
            .bind(&input.subject)
            .bind(&input.body)
            .bind(&input.from_address)
            .bind(input.received_at)
            .bind(input.processed)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(email)
    }

    /// List an item's emails, most recently received first.
    pub async fn list_for_item(
        executor: impl PgExecutor<'_>,
        item_id: DbId,
    ) -> Result<Vec<Email>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM item_emails WHERE item_id = $1 \
             ORDER BY received_at DESC, id DESC"
        );
        sqlx::query_as::<_, Email>(&query)
            .bind(item_id)
            .fetch_all(executor)
            .await
    }

    /// Delete an email. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, item_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM item_emails WHERE id = $1 AND item_id = $2")
            .bind(id)
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
