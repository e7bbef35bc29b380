//! Email attachment models.

use inventory_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `item_emails` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Email {
    pub id: DbId,
    pub item_id: DbId,
    pub subject: String,
    pub body: String,
    pub from_address: String,
    pub received_at: Timestamp,
    pub processed: bool,
    pub created_at: Timestamp,
}

/// DTO for attaching an email.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEmail {
    #[validate(length(min = 1, max = 255))]
    pub subject: String,
    #[validate(length(max = 100000))]
    pub body: String,
    #[validate(email)]
    pub from_address: String,
    pub received_at: Timestamp,
    #[serde(default)]
    pub processed: bool,
}
