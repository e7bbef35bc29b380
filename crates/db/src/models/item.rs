//! Inventory item models and DTOs.

use inventory_core::tree::{TreeNode, TreeRecord};
use inventory_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::code::Code;
use crate::models::email::Email;
use crate::models::file::ItemFile;
use crate::models::history::HistoryEntry;
use crate::models::note::Note;

// ---------------------------------------------------------------------------
// Entity structs (database rows)
// ---------------------------------------------------------------------------

/// A row from the `items` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Item {
    pub id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub qr_code: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// An item row plus the number of attachments (notes, files, emails, codes)
/// it carries. This is the shape every listing endpoint renders.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ItemListing {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub item: Item,
    pub attachment_count: i64,
}

impl TreeRecord for ItemListing {
    fn id(&self) -> DbId {
        self.item.id
    }

    fn parent_id(&self) -> Option<DbId> {
        self.item.parent_id
    }

    fn name(&self) -> &str {
        &self.item.name
    }
}

/// Result of deleting an item.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteOutcome {
    /// Every item removed, the target first.
    pub deleted_ids: Vec<DbId>,
    /// Direct children moved to root (orphan policy only).
    pub orphaned_ids: Vec<DbId>,
    /// Blob keys of file attachments that went with the deleted items.
    /// The caller purges them after the transaction commits.
    #[serde(skip)]
    pub storage_keys: Vec<String>,
}

// ---------------------------------------------------------------------------
// Composite responses
// ---------------------------------------------------------------------------

/// Full detail view: the item with its subtree, every attachment, and its
/// history.
#[derive(Debug, Clone, Serialize)]
pub struct ItemDetail {
    #[serde(flatten)]
    pub node: TreeNode<ItemListing>,
    pub notes: Vec<Note>,
    pub files: Vec<ItemFile>,
    pub emails: Vec<Email>,
    pub codes: Vec<Code>,
    pub history: Vec<HistoryEntry>,
}

/// Ancestor chain of an item, root first, and its joined path.
#[derive(Debug, Clone, Serialize)]
pub struct ItemPath {
    pub items: Vec<ItemListing>,
    pub full_path: String,
}

// ---------------------------------------------------------------------------
// DTOs (request payloads)
// ---------------------------------------------------------------------------

/// DTO for creating an item. Omitting `parent_id` creates a root.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateItem {
    pub name: String,
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub qr_code: Option<String>,
    pub parent_id: Option<DbId>,
}

/// DTO for editing an item's attributes. Re-parenting goes through
/// [`MoveItem`] instead so it is validated and recorded.
///
/// `description` and `qr_code` distinguish a missing field (keep) from an
/// explicit `null` (clear).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateItem {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_clearable")]
    #[validate(length(max = 10000))]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_clearable")]
    #[validate(length(min = 1, max = 255))]
    pub qr_code: Option<Option<String>>,
}

/// A present field, `null` included, becomes `Some(_)`.
fn deserialize_clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// DTO for re-parenting an item. `null` or an absent field moves it to root.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoveItem {
    #[serde(default, alias = "parent_id")]
    pub new_parent_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

/// Query parameters for `GET /items`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemListParams {
    #[serde(default = "default_true")]
    pub hierarchical: bool,
}

/// Query parameters for `GET /items/search`. Results are flat unless
/// `hierarchical=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemSearchParams {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub hierarchical: bool,
}
