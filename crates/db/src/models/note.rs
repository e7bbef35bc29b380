//! Note attachment models.

use inventory_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `item_notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub item_id: DbId,
    pub content: String,
    pub author: String,
    pub created_at: Timestamp,
}

/// DTO for adding a note. A blank `author` is stored as the default author.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNote {
    pub content: String,
    pub author: Option<String>,
}
