//! Repository for the `items` table: the inventory tree.
//!
//! Structural mutations (create, move, delete) run in a single transaction
//! that first takes the tree advisory lock, revalidates against the rows it
//! can now see, applies the change, and appends the history entry on the
//! same connection. Either all of that commits or none of it does.

use inventory_core::error::CoreError;
use inventory_core::history::ActionType;
use inventory_core::tree::{
    validate_item_name, validate_move, DeletePolicy, TREE_MUTATION_LOCK_ID,
};
use inventory_core::types::DbId;
use sqlx::{PgExecutor, PgPool, Postgres, Transaction};

use crate::error::StoreError;
use crate::models::history::NewHistoryEntry;
use crate::models::item::{CreateItem, DeleteOutcome, Item, ItemListing, UpdateItem};
use crate::repositories::HistoryRepo;

/// Column list for `items` queries.
const COLUMNS: &str = "id, parent_id, name, description, qr_code, created_at, updated_at";

/// Item columns plus the attachment count, for queries that alias `items` as `i`.
const LISTING_COLUMNS: &str = "\
    i.id, i.parent_id, i.name, i.description, i.qr_code, i.created_at, i.updated_at, \
    ((SELECT COUNT(*) FROM item_notes n WHERE n.item_id = i.id) \
     + (SELECT COUNT(*) FROM item_files f WHERE f.item_id = i.id) \
     + (SELECT COUNT(*) FROM item_emails e WHERE e.item_id = i.id) \
     + (SELECT COUNT(*) FROM item_codes c WHERE c.item_id = i.id))::BIGINT AS attachment_count";

/// Ids on the chain from `$1` up to its root, `$1` first.
///
/// Unbounded in depth; `path` stops the walk if it ever meets an id twice.
const ANCESTRY_CTE: &str = "\
    WITH RECURSIVE chain AS ( \
        SELECT id, parent_id, 0 AS depth, ARRAY[id] AS path FROM items WHERE id = $1 \
        UNION ALL \
        SELECT p.id, p.parent_id, ch.depth + 1, ch.path || p.id \
        FROM items p JOIN chain ch ON p.id = ch.parent_id \
        WHERE p.id <> ALL(ch.path) \
    )";

/// Ids in the subtree rooted at `$1`, `$1` included. Unbounded in depth.
const SUBTREE_CTE: &str = "\
    WITH RECURSIVE subtree AS ( \
        SELECT id, 0 AS depth, ARRAY[id] AS path FROM items WHERE id = $1 \
        UNION ALL \
        SELECT c.id, s.depth + 1, s.path || c.id \
        FROM items c JOIN subtree s ON c.parent_id = s.id \
        WHERE c.id <> ALL(s.path) \
    )";

/// Provides tree reads and the transactional structural mutations.
pub struct ItemRepo;

impl ItemRepo {
    // -----------------------------------------------------------------------
    // Structural mutations
    // -----------------------------------------------------------------------

    /// Create an item, as a root or under an existing parent, and record it.
    pub async fn create(pool: &PgPool, input: &CreateItem) -> Result<Item, StoreError> {
        let name = validate_item_name(&input.name)?;

        let mut tx = pool.begin().await?;
        lock_tree(&mut tx).await?;

        if let Some(parent_id) = input.parent_id {
            if !Self::exists_in(&mut tx, parent_id).await? {
                return Err(CoreError::NotFound {
                    entity: "Parent item",
                    id: parent_id,
                }
                .into());
            }
        }

        let query = format!(
            "INSERT INTO items (parent_id, name, description, qr_code) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&query)
            .bind(input.parent_id)
            .bind(name)
            .bind(&input.description)
            .bind(&input.qr_code)
            .fetch_one(&mut *tx)
            .await?;

        HistoryRepo::record(
            &mut tx,
            &NewHistoryEntry {
                item_id: item.id,
                old_parent_id: None,
                new_parent_id: item.parent_id,
                action: ActionType::Created,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Re-parent an item. `None` moves it to root.
    ///
    /// Rejects a missing item or parent with `NotFound`, and a move under
    /// the item itself or one of its descendants with `CircularDependency`.
    /// The ancestry check runs after the tree lock is held, so two opposing
    /// concurrent moves cannot both pass it.
    pub async fn move_item(
        pool: &PgPool,
        id: DbId,
        new_parent_id: Option<DbId>,
    ) -> Result<Item, StoreError> {
        let mut tx = pool.begin().await?;
        lock_tree(&mut tx).await?;

        let current = Self::lock_item(&mut tx, id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Item", id })?;

        let ancestry = match new_parent_id {
            Some(parent_id) => {
                let chain = Self::ancestry_ids(&mut tx, parent_id).await?;
                if chain.is_empty() {
                    return Err(CoreError::NotFound {
                        entity: "Parent item",
                        id: parent_id,
                    }
                    .into());
                }
                chain
            }
            None => Vec::new(),
        };

        if let Err(e) = validate_move(id, new_parent_id, &ancestry) {
            tracing::warn!(item_id = id, new_parent_id = ?new_parent_id, error = %e, "Move rejected");
            return Err(e.into());
        }

        let query = format!(
            "UPDATE items SET parent_id = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .bind(new_parent_id)
            .fetch_one(&mut *tx)
            .await?;

        HistoryRepo::record(
            &mut tx,
            &NewHistoryEntry {
                item_id: id,
                old_parent_id: current.parent_id,
                new_parent_id,
                action: ActionType::Moved,
            },
        )
        .await?;

        tx.commit().await?;
        Ok(item)
    }

    /// Delete an item according to `policy`.
    ///
    /// - `Cascade` removes the item and its whole subtree.
    /// - `Orphan` moves the direct children to root, then removes the item.
    ///
    /// One `DELETED` entry is recorded for the target, before the rows go so
    /// its names can still be resolved. Under `Orphan` each re-rooted child
    /// also gets a `MOVED` entry to root.
    pub async fn delete(
        pool: &PgPool,
        id: DbId,
        policy: DeletePolicy,
    ) -> Result<DeleteOutcome, StoreError> {
        let mut tx = pool.begin().await?;
        lock_tree(&mut tx).await?;

        let item = Self::lock_item(&mut tx, id)
            .await?
            .ok_or(CoreError::NotFound { entity: "Item", id })?;

        HistoryRepo::record(
            &mut tx,
            &NewHistoryEntry {
                item_id: id,
                old_parent_id: item.parent_id,
                new_parent_id: None,
                action: ActionType::Deleted,
            },
        )
        .await?;

        let (deleted_ids, orphaned_ids) = match policy {
            DeletePolicy::Cascade => (Self::subtree_ids(&mut tx, id).await?, Vec::new()),
            DeletePolicy::Orphan => {
                let orphaned: Vec<DbId> = sqlx::query_scalar(
                    "SELECT id FROM items WHERE parent_id = $1 ORDER BY id FOR UPDATE",
                )
                .bind(id)
                .fetch_all(&mut *tx)
                .await?;

                // Each re-rooted child gets its own MOVED entry, written while
                // the old parent's name can still be resolved.
                for &child_id in &orphaned {
                    HistoryRepo::record(
                        &mut tx,
                        &NewHistoryEntry {
                            item_id: child_id,
                            old_parent_id: Some(id),
                            new_parent_id: None,
                            action: ActionType::Moved,
                        },
                    )
                    .await?;
                }

                sqlx::query(
                    "UPDATE items SET parent_id = NULL, updated_at = NOW() \
                     WHERE id = ANY($1)",
                )
                .bind(orphaned.as_slice())
                .execute(&mut *tx)
                .await?;
                (vec![id], orphaned)
            }
        };

        // Row locks keep attachments from landing on the doomed items while
        // their blob keys are collected.
        sqlx::query("SELECT id FROM items WHERE id = ANY($1) FOR UPDATE")
            .bind(deleted_ids.as_slice())
            .execute(&mut *tx)
            .await?;

        let storage_keys: Vec<String> =
            sqlx::query_scalar("SELECT storage_key FROM item_files WHERE item_id = ANY($1)")
                .bind(deleted_ids.as_slice())
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM items WHERE id = ANY($1)")
            .bind(deleted_ids.as_slice())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(DeleteOutcome {
            deleted_ids,
            orphaned_ids,
            storage_keys,
        })
    }

    // -----------------------------------------------------------------------
    // Attribute edits
    // -----------------------------------------------------------------------

    /// Update name, description, or QR code. Omitted fields are kept; an
    /// explicit `None` inside `Some` clears `description` or `qr_code`.
    /// Returns `None` if no item with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateItem,
    ) -> Result<Option<Item>, StoreError> {
        let name = input.name.as_deref().map(validate_item_name).transpose()?;
        let description = input.description.as_ref().map(|v| v.as_deref());
        let qr_code = input.qr_code.as_ref().map(|v| v.as_deref());

        let query = format!(
            "UPDATE items SET \
                name = COALESCE($2, name), \
                description = CASE WHEN $3 THEN $4 ELSE description END, \
                qr_code = CASE WHEN $5 THEN $6 ELSE qr_code END, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let item = sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .bind(name)
            .bind(description.is_some())
            .bind(description.flatten())
            .bind(qr_code.is_some())
            .bind(qr_code.flatten())
            .fetch_optional(pool)
            .await?;
        Ok(item)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Find an item by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every item, ordered by name.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<ItemListing>, sqlx::Error> {
        let query = format!("SELECT {LISTING_COLUMNS} FROM items i ORDER BY i.name, i.id");
        sqlx::query_as::<_, ItemListing>(&query)
            .fetch_all(pool)
            .await
    }

    /// The subtree rooted at `id`, shallowest first. Empty if `id` does not exist.
    pub async fn subtree(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Vec<ItemListing>, sqlx::Error> {
        let query = format!(
            "{SUBTREE_CTE} \
             SELECT {LISTING_COLUMNS} FROM subtree s JOIN items i ON i.id = s.id \
             ORDER BY s.depth, i.name, i.id"
        );
        sqlx::query_as::<_, ItemListing>(&query)
            .bind(id)
            .fetch_all(executor)
            .await
    }

    /// The ancestor chain of `id`, root first and `id` last.
    /// Empty if `id` does not exist.
    pub async fn ancestors(
        executor: impl PgExecutor<'_>,
        id: DbId,
    ) -> Result<Vec<ItemListing>, sqlx::Error> {
        let query = format!(
            "{ANCESTRY_CTE} \
             SELECT {LISTING_COLUMNS} FROM chain ch JOIN items i ON i.id = ch.id \
             ORDER BY ch.depth DESC"
        );
        sqlx::query_as::<_, ItemListing>(&query)
            .bind(id)
            .fetch_all(executor)
            .await
    }

    /// Items sharing `id`'s parent (other roots, for a root), `id` excluded.
    pub async fn siblings(pool: &PgPool, id: DbId) -> Result<Vec<ItemListing>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS} FROM items i \
             JOIN items me ON me.id = $1 \
             WHERE i.parent_id IS NOT DISTINCT FROM me.parent_id AND i.id <> me.id \
             ORDER BY i.name, i.id"
        );
        sqlx::query_as::<_, ItemListing>(&query)
            .bind(id)
            .fetch_all(pool)
            .await
    }

    /// Items matching a normalized search term.
    ///
    /// Name and description match by case-insensitive substring
    /// (`pattern` is a pre-escaped `ILIKE` pattern); QR code and attached
    /// codes match `term` exactly, ignoring case.
    pub async fn search(
        pool: &PgPool,
        term: &str,
        pattern: &str,
    ) -> Result<Vec<ItemListing>, sqlx::Error> {
        let query = format!(
            "SELECT {LISTING_COLUMNS} FROM items i \
             WHERE i.name ILIKE $1 ESCAPE '\\' \
                OR i.description ILIKE $1 ESCAPE '\\' \
                OR LOWER(i.qr_code) = LOWER($2) \
                OR EXISTS ( \
                    SELECT 1 FROM item_codes ic \
                    WHERE ic.item_id = i.id AND LOWER(ic.code) = LOWER($2) \
                ) \
             ORDER BY i.name, i.id"
        );
        sqlx::query_as::<_, ItemListing>(&query)
            .bind(pattern)
            .bind(term)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Transaction helpers
    // -----------------------------------------------------------------------

    /// Lock an item row against structural changes while an attachment is
    /// added to it. Fails with `NotFound` if the item does not exist.
    pub(crate) async fn lock_owner(
        tx: &mut Transaction<'_, Postgres>,
        item_id: DbId,
    ) -> Result<(), StoreError> {
        let found: Option<DbId> =
            sqlx::query_scalar("SELECT id FROM items WHERE id = $1 FOR SHARE")
                .bind(item_id)
                .fetch_optional(&mut **tx)
                .await?;
        match found {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound {
                entity: "Item",
                id: item_id,
            }
            .into()),
        }
    }

    async fn lock_item(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    async fn exists_in(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM items WHERE id = $1)")
            .bind(id)
            .fetch_one(&mut **tx)
            .await
    }

    async fn ancestry_ids(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!("{ANCESTRY_CTE} SELECT id FROM chain ORDER BY depth");
        sqlx::query_scalar(&query)
            .bind(id)
            .fetch_all(&mut **tx)
            .await
    }

    async fn subtree_ids(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let query = format!("{SUBTREE_CTE} SELECT DISTINCT ON (id) id FROM subtree ORDER BY id");
        let mut ids: Vec<DbId> = sqlx::query_scalar(&query)
            .bind(id)
            .fetch_all(&mut **tx)
            .await?;
        // Target first, so callers can report it as the primary deletion.
        if let Some(pos) = ids.iter().position(|&x| x == id) {
            ids.swap(0, pos);
        }
        Ok(ids)
    }
}

/// Take the transaction-scoped tree mutation lock.
async fn lock_tree(tx: &mut Transaction<'_, Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(TREE_MUTATION_LOCK_ID)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
