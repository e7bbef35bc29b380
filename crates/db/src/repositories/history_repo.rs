//! Repository for the `item_history` table (the append-only ledger).

use inventory_core::history::{clamp_limit, clamp_offset, ActionType};
use inventory_core::types::DbId;
use sqlx::{PgExecutor, Postgres, Transaction};

use crate::models::history::{HistoryEntry, NewHistoryEntry};

/// Column list for `item_history` queries.
const COLUMNS: &str = "\
    id, item_id, item_name, old_parent_id, old_parent_name, \
    new_parent_id, new_parent_name, action_type, changed_at";

/// Appends and reads ledger entries. There is no update or delete path;
/// the table's trigger rejects both.
pub struct HistoryRepo;

impl HistoryRepo {
    /// Append an entry inside the caller's transaction.
    ///
    /// Item and parent names are resolved from `items` at write time, so the
    /// entry must be recorded while the referenced rows still exist.
    pub async fn record(
        tx: &mut Transaction<'_, Postgres>,
        entry: &NewHistoryEntry,
    ) -> Result<HistoryEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO item_history \
                (item_id, item_name, old_parent_id, old_parent_name, \
                 new_parent_id, new_parent_name, action_type) \
             VALUES ( \
                $1, (SELECT name FROM items WHERE id = $1), \
                $2, (SELECT name FROM items WHERE id = $2), \
                $3, (SELECT name FROM items WHERE id = $3), \
                $4) \
             RETURNING {COLUMNS}"
        );
        let recorded = sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(entry.item_id)
            .bind(entry.old_parent_id)
            .bind(entry.new_parent_id)
            .bind(entry.action.as_str())
            .fetch_one(&mut **tx)
            .await?;

        tracing::info!(
            history_id = recorded.id,
            item_id = entry.item_id,
            action = entry.action.as_str(),
            old_parent_id = ?entry.old_parent_id,
            new_parent_id = ?entry.new_parent_id,
            "Tree change recorded",
        );
        Ok(recorded)
    }

    /// List entries, newest first, optionally filtered by item and action.
    pub async fn list(
        executor: impl PgExecutor<'_>,
        item_id: Option<DbId>,
        action: Option<ActionType>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM item_history \
             WHERE ($1::BIGINT IS NULL OR item_id = $1) \
               AND ($2::TEXT IS NULL OR action_type = $2) \
             ORDER BY changed_at DESC, id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, HistoryEntry>(&query)
            .bind(item_id)
            .bind(action.map(|a| a.as_str()))
            .bind(clamp_limit(limit))
            .bind(clamp_offset(offset))
            .fetch_all(executor)
            .await
    }

    /// Every entry for one item, newest first.
    pub async fn list_for_item(
        executor: impl PgExecutor<'_>,
        item_id: DbId,
    ) -> Result<Vec<HistoryEntry>, sqlx::Error> {
        Self::list(executor, Some(item_id), None, None, None).await
    }
}
