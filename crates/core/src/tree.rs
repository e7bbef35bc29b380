//! Inventory tree rules: move validation, delete policy, and rendering of
//! flat item rows into nested or flat views.
//!
//! The tree is stored as an adjacency list (`parent_id`). Nothing in this
//! module touches the database: the repository layer loads the rows and the
//! ancestor chains, and the functions here decide and shape.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Separator used when joining ancestor names into a full path.
pub const PATH_SEPARATOR: &str = "/";

/// PostgreSQL advisory lock ID taken by every structural mutation
/// (create, move, delete). Serializes tree writers; readers never take it.
pub const TREE_MUTATION_LOCK_ID: i64 = 740_112_583;

/// Delete policy identifiers.
pub const DELETE_POLICY_CASCADE: &str = "cascade";
pub const DELETE_POLICY_ORPHAN: &str = "orphan";

/// All valid delete policy values.
pub const VALID_DELETE_POLICIES: &[&str] = &[DELETE_POLICY_CASCADE, DELETE_POLICY_ORPHAN];

// ---------------------------------------------------------------------------
// Delete policy
// ---------------------------------------------------------------------------

/// What happens to the children of a deleted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Remove the item together with its whole subtree.
    #[default]
    Cascade,
    /// Detach the direct children to root, then remove the item alone.
    Orphan,
}

impl DeletePolicy {
    /// Return the configuration string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => DELETE_POLICY_CASCADE,
            Self::Orphan => DELETE_POLICY_ORPHAN,
        }
    }

    /// Parse from a string, returning an error for unknown policies.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            DELETE_POLICY_CASCADE => Ok(Self::Cascade),
            DELETE_POLICY_ORPHAN => Ok(Self::Orphan),
            other => Err(CoreError::Validation(format!(
                "Unknown delete policy: '{other}'. Valid policies: {}",
                VALID_DELETE_POLICIES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Item names
// ---------------------------------------------------------------------------

/// Maximum length of an item name in characters.
pub const MAX_ITEM_NAME_LENGTH: usize = 255;

/// Trim an item name and check it is non-blank and within the length limit.
pub fn validate_item_name(name: &str) -> Result<&str, CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Item name cannot be empty".to_string()));
    }
    if trimmed.chars().count() > MAX_ITEM_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Item name exceeds maximum length of {MAX_ITEM_NAME_LENGTH} characters"
        )));
    }
    Ok(trimmed)
}

// ---------------------------------------------------------------------------
// Move validation
// ---------------------------------------------------------------------------

/// Decide whether `item_id` may be re-parented under `new_parent_id`.
///
/// `new_parent_ancestry` holds the ids on the chain from the new parent up to
/// its root, the new parent included. Rules, in order:
///
/// 1. Moving to root (`None`) is always valid.
/// 2. An item cannot become its own parent.
/// 3. An item cannot move under one of its own descendants.
pub fn validate_move(
    item_id: DbId,
    new_parent_id: Option<DbId>,
    new_parent_ancestry: &[DbId],
) -> Result<(), CoreError> {
    let Some(parent_id) = new_parent_id else {
        return Ok(());
    };

    if parent_id == item_id {
        return Err(CoreError::CircularDependency(format!(
            "item {item_id} cannot be its own parent"
        )));
    }

    if new_parent_ancestry.contains(&item_id) {
        return Err(CoreError::CircularDependency(format!(
            "item {parent_id} is a descendant of item {item_id}"
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tree index
// ---------------------------------------------------------------------------

/// A node that can be placed in a [`TreeIndex`].
pub trait TreeRecord {
    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    fn name(&self) -> &str;
}

/// In-memory index over a set of loaded rows, keyed by id and by parent.
///
/// Children are ordered by name, then id. All walks are guarded against
/// loops so a corrupted parent chain cannot hang a request.
pub struct TreeIndex<'a, T> {
    by_id: HashMap<DbId, &'a T>,
    children: HashMap<Option<DbId>, Vec<&'a T>>,
}

impl<'a, T: TreeRecord> TreeIndex<'a, T> {
    pub fn new(records: &'a [T]) -> Self {
        let mut by_id = HashMap::with_capacity(records.len());
        let mut children: HashMap<Option<DbId>, Vec<&'a T>> = HashMap::new();

        for record in records {
            by_id.insert(record.id(), record);
            children.entry(record.parent_id()).or_default().push(record);
        }
        for siblings in children.values_mut() {
            siblings.sort_by(|a, b| a.name().cmp(b.name()).then(a.id().cmp(&b.id())));
        }

        Self { by_id, children }
    }

    pub fn get(&self, id: DbId) -> Option<&'a T> {
        self.by_id.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Ids of the loaded records that have no parent, ordered by name.
    pub fn root_ids(&self) -> Vec<DbId> {
        self.children
            .get(&None)
            .map(|roots| roots.iter().map(|r| r.id()).collect())
            .unwrap_or_default()
    }

    /// Direct children of `id` among the loaded records.
    pub fn children_of(&self, id: DbId) -> &[&'a T] {
        self.children
            .get(&Some(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ancestor chain ordered root → `id`, `id` included.
    ///
    /// The walk stops at the first parent that is not loaded, or when a
    /// record would be visited twice.
    pub fn ancestors(&self, id: DbId) -> Vec<&'a T> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.get(id);

        while let Some(record) = current {
            if !seen.insert(record.id()) {
                break;
            }
            chain.push(record);
            current = record.parent_id().and_then(|p| self.get(p));
        }

        chain.reverse();
        chain
    }

    /// Names on the ancestor chain joined with [`PATH_SEPARATOR`].
    pub fn full_path(&self, id: DbId) -> String {
        self.ancestors(id)
            .iter()
            .map(|r| r.name())
            .collect::<Vec<_>>()
            .join(PATH_SEPARATOR)
    }

    /// Number of loaded ancestors above `id` (a root is level 0).
    pub fn level(&self, id: DbId) -> usize {
        self.ancestors(id).len().saturating_sub(1)
    }

    /// All loaded descendants of `id` in breadth-first order, `id` excluded.
    pub fn descendant_ids(&self, id: DbId) -> Vec<DbId> {
        let mut out = Vec::new();
        let mut seen = HashSet::from([id]);
        let mut queue = VecDeque::from([id]);

        while let Some(current) = queue.pop_front() {
            for child in self.children_of(current) {
                if seen.insert(child.id()) {
                    out.push(child.id());
                    queue.push_back(child.id());
                }
            }
        }

        out
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Response shaping for item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Each node carries its nested children.
    #[default]
    Hierarchical,
    /// Children arrays are always empty.
    Flat,
}

impl RenderMode {
    pub fn from_hierarchical(hierarchical: bool) -> Self {
        if hierarchical {
            Self::Hierarchical
        } else {
            Self::Flat
        }
    }
}

/// A rendered item with its derived view fields.
#[derive(Debug, Clone, Serialize)]
pub struct TreeNode<T> {
    #[serde(flatten)]
    pub record: T,
    pub level: usize,
    pub full_path: String,
    pub children: Vec<TreeNode<T>>,
}

/// Render `root_ids` from `index`.
///
/// `visited` holds every node emitted so far in this render; a node already
/// in it is skipped, so a single response never contains the same item twice
/// (for instance a search hit that is also a descendant of an earlier hit).
/// Ids missing from the index are skipped.
pub fn render<T: TreeRecord + Clone>(
    index: &TreeIndex<'_, T>,
    root_ids: &[DbId],
    mode: RenderMode,
    visited: &mut HashSet<DbId>,
) -> Vec<TreeNode<T>> {
    root_ids
        .iter()
        .filter_map(|&id| render_node(index, id, mode, visited))
        .collect()
}

fn render_node<T: TreeRecord + Clone>(
    index: &TreeIndex<'_, T>,
    id: DbId,
    mode: RenderMode,
    visited: &mut HashSet<DbId>,
) -> Option<TreeNode<T>> {
    let record = index.get(id)?;
    if !visited.insert(id) {
        return None;
    }

    let children = match mode {
        RenderMode::Hierarchical => index
            .children_of(id)
            .iter()
            .filter_map(|child| render_node(index, child.id(), mode, visited))
            .collect(),
        RenderMode::Flat => Vec::new(),
    };

    Some(TreeNode {
        record: record.clone(),
        level: index.level(id),
        full_path: index.full_path(id),
        children,
    })
}

/// Order ids shallowest first, then by name, so that when rendered
/// hierarchically an ancestor claims its descendants before they are
/// reached as top-level entries.
pub fn sort_by_depth<T: TreeRecord>(index: &TreeIndex<'_, T>, ids: &mut [DbId]) {
    ids.sort_by_cached_key(|&id| {
        let name = index.get(id).map(|r| r.name().to_string()).unwrap_or_default();
        (index.level(id), name, id)
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
