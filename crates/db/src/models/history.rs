//! History ledger models.

use inventory_core::history::ActionType;
use inventory_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `item_history` table.
///
/// Names are captured when the entry is written, so they stay readable after
/// the referenced items are renamed or deleted. The id columns are nulled
/// when their item is deleted.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct HistoryEntry {
    pub id: DbId,
    pub item_id: Option<DbId>,
    pub item_name: String,
    pub old_parent_id: Option<DbId>,
    pub old_parent_name: Option<String>,
    pub new_parent_id: Option<DbId>,
    pub new_parent_name: Option<String>,
    pub action_type: String,
    pub changed_at: Timestamp,
}

/// An entry to append, written inside the mutation's transaction.
#[derive(Debug, Clone, Copy)]
pub struct NewHistoryEntry {
    pub item_id: DbId,
    pub old_parent_id: Option<DbId>,
    pub new_parent_id: Option<DbId>,
    pub action: ActionType,
}

/// Query parameters for history listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    pub item_id: Option<DbId>,
    pub action_type: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
