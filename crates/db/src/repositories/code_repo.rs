//! Repository for the `item_codes` table.

use inventory_core::attachments::validate_code;
use inventory_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::error::StoreError;
use crate::models::code::{Code, CreateCode, DEFAULT_CODE_SOURCE};
use crate::repositories::ItemRepo;

/// Column list for `item_codes` queries.
const COLUMNS: &str = "id, item_id, code, source, created_at";

/// Provides create, list, and delete for item codes.
pub struct CodeRepo;

impl CodeRepo {
    /// Attach a code to an item.
    ///
    /// Fails with `NotFound` if the item does not exist. A code already on
    /// the item (ignoring case) violates `uq_item_codes_item_code`.
    pub async fn create(
        pool: &PgPool,
        item_id: DbId,
        input: &CreateCode,
    ) -> Result<Code, StoreError> {
        let code = input.code.trim();
        let source = input
            .source
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_CODE_SOURCE);
        validate_code(code, source)?;

        let mut tx = pool.begin().await?;
        ItemRepo::lock_owner(&mut tx, item_id).await?;

        let query = format!(
            "INSERT INTO item_codes (item_id, code, source) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Code>(&query)
            .bind(item_id)
            .bind(code)
            .bind(source)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(created)
    }

    /// List an item's codes, newest first.
    pub async fn list_for_item(
        executor: impl PgExecutor<'_>,
        item_id: DbId,
    ) -> Result<Vec<Code>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM item_codes WHERE item_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Code>(&query)
            .bind(item_id)
            .fetch_all(executor)
            .await
    }

    /// Delete a code. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, item_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM item_codes WHERE id = $1 AND item_id = $2")
            .bind(id)
            .bind(item_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
