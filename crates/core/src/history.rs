//! History ledger action types and query limits.
//!
//! Every structural mutation of the tree (create, move, delete) writes exactly
//! one ledger entry carrying one of these action types.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Action types
// ---------------------------------------------------------------------------

pub const ACTION_CREATED: &str = "CREATED";
pub const ACTION_MOVED: &str = "MOVED";
pub const ACTION_DELETED: &str = "DELETED";

/// All valid action type values.
pub const VALID_ACTION_TYPES: &[&str] = &[ACTION_CREATED, ACTION_MOVED, ACTION_DELETED];

/// Structural event recorded in the history ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionType {
    Created,
    Moved,
    Deleted,
}

impl ActionType {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => ACTION_CREATED,
            Self::Moved => ACTION_MOVED,
            Self::Deleted => ACTION_DELETED,
        }
    }

    /// Parse from a string (case-insensitive), returning an error for unknown types.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s.to_ascii_uppercase().as_str() {
            ACTION_CREATED => Ok(Self::Created),
            ACTION_MOVED => Ok(Self::Moved),
            ACTION_DELETED => Ok(Self::Deleted),
            _ => Err(CoreError::Validation(format!(
                "Unknown action type: '{s}'. Valid types: {}",
                VALID_ACTION_TYPES.join(", ")
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Query limits
// ---------------------------------------------------------------------------

/// Default number of ledger entries returned by a history query.
pub const DEFAULT_HISTORY_LIMIT: i64 = 100;

/// Maximum number of ledger entries returned by a history query.
pub const MAX_HISTORY_LIMIT: i64 = 500;

/// Clamp a user-provided limit to `1..=MAX_HISTORY_LIMIT`.
pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
