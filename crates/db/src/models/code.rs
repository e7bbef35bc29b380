//! Code attachment models (serials, barcodes, part numbers).

use inventory_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Source recorded when a code is added without one.
pub const DEFAULT_CODE_SOURCE: &str = "manual";

/// A row from the `item_codes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Code {
    pub id: DbId,
    pub item_id: DbId,
    pub code: String,
    pub source: String,
    pub created_at: Timestamp,
}

/// DTO for attaching a code.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCode {
    pub code: String,
    pub source: Option<String>,
}
