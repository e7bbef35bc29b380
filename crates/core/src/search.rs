//! Free-text item search helpers.
//!
//! Matching itself runs in PostgreSQL: name and description by
//! case-insensitive substring, QR code and attached codes by case-insensitive
//! equality. This module prepares the user input for those predicates.

use crate::error::CoreError;

/// Maximum length of a search query in characters.
pub const MAX_QUERY_LENGTH: usize = 200;

/// Escape character used in generated `LIKE` patterns.
pub const LIKE_ESCAPE: char = '\\';

/// Trim a raw query. Returns `Ok(None)` for blank input, which callers treat
/// as "no matches" rather than "match everything".
pub fn normalize_query(raw: &str) -> Result<Option<String>, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_QUERY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Search query exceeds maximum length of {MAX_QUERY_LENGTH} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Build a `%term%` pattern for `ILIKE ... ESCAPE '\'`, escaping the LIKE
/// metacharacters so user input only ever matches literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
