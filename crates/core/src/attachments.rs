//! Attachment limits and validation (notes, files, emails, codes).
//!
//! Everything an item can carry besides its tree position is checked here
//! before the repository layer persists it.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default ceiling for a single uploaded file (25 MiB).
pub const MAX_FILE_SIZE_BYTES: u64 = 25 * 1024 * 1024;

/// MIME type prefixes accepted for file attachments.
pub const ACCEPTED_MIME_PREFIXES: &[&str] = &[
    "image/",
    "text/",
    "application/pdf",
    "application/zip",
    "application/json",
    "message/rfc822",
];

/// Maximum length of an uploaded file's display name.
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Maximum length of note content in characters.
pub const MAX_NOTE_CONTENT_LENGTH: usize = 10_000;

/// Maximum length of a note author.
pub const MAX_AUTHOR_LENGTH: usize = 255;

/// Author recorded when a note is created without one.
pub const DEFAULT_NOTE_AUTHOR: &str = "User";

/// Maximum length of a code identifier.
pub const MAX_CODE_LENGTH: usize = 255;

/// Maximum length of a code source label.
pub const MAX_CODE_SOURCE_LENGTH: usize = 50;

/// Attachment family names, used in log fields and not-found errors.
pub const FAMILY_NOTE: &str = "Note";
pub const FAMILY_FILE: &str = "File";
pub const FAMILY_EMAIL: &str = "Email";
pub const FAMILY_CODE: &str = "Code";

static MIME_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9!#$&^_.+-]*/[a-z0-9][a-z0-9!#$&^_.+-]*$")
        .expect("MIME type pattern is valid")
});

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Lowercase a content type and drop any parameters (`text/plain; charset=utf-8`
/// becomes `text/plain`).
pub fn normalize_content_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Validate an upload's content type and size against the accepted limits.
pub fn validate_file(content_type: &str, size_bytes: u64, max_bytes: u64) -> Result<(), CoreError> {
    if size_bytes == 0 {
        return Err(CoreError::Validation("File must not be empty".to_string()));
    }
    if size_bytes > max_bytes {
        return Err(CoreError::Validation(format!(
            "File size {size_bytes} bytes exceeds the maximum of {max_bytes} bytes"
        )));
    }

    let essence = normalize_content_type(content_type);
    if !MIME_TYPE_RE.is_match(&essence) {
        return Err(CoreError::Validation(format!(
            "Invalid content type '{content_type}'"
        )));
    }
    if !ACCEPTED_MIME_PREFIXES
        .iter()
        .any(|prefix| essence.starts_with(prefix))
    {
        return Err(CoreError::Validation(format!(
            "Unsupported content type '{essence}'. Accepted: {}",
            ACCEPTED_MIME_PREFIXES.join(", ")
        )));
    }

    Ok(())
}

/// Reduce a client-supplied file name to a safe storage name.
///
/// Keeps the last path component, replaces anything outside
/// `[A-Za-z0-9._-]` with `_`, and falls back to `file` when nothing usable
/// remains.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_FILE_NAME_LENGTH)
        .collect();
    let trimmed = cleaned.trim_matches('.');

    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Hex-encoded SHA-256 digest of file content.
pub fn sha256_hex(data: &[u8]) -> String {
    let digest = Sha256::digest(data);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Notes
// ---------------------------------------------------------------------------

/// Validate note content: must be non-blank and within the length limit.
pub fn validate_note_content(content: &str) -> Result<(), CoreError> {
    if content.trim().is_empty() {
        return Err(CoreError::Validation(
            "Note content cannot be empty".to_string(),
        ));
    }
    if content.chars().count() > MAX_NOTE_CONTENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Note content exceeds maximum length of {MAX_NOTE_CONTENT_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Resolve the author of a note, defaulting blank input to [`DEFAULT_NOTE_AUTHOR`].
pub fn normalize_author(author: Option<&str>) -> Result<String, CoreError> {
    let author = author.map(str::trim).filter(|a| !a.is_empty());
    match author {
        None => Ok(DEFAULT_NOTE_AUTHOR.to_string()),
        Some(a) if a.chars().count() > MAX_AUTHOR_LENGTH => Err(CoreError::Validation(format!(
            "Author exceeds maximum length of {MAX_AUTHOR_LENGTH} characters"
        ))),
        Some(a) => Ok(a.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

/// Validate a code identifier and its source label.
pub fn validate_code(code: &str, source: &str) -> Result<(), CoreError> {
    if code.is_empty() || code.chars().count() > MAX_CODE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Code must be between 1 and {MAX_CODE_LENGTH} characters"
        )));
    }
    if code.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(
            "Code must not contain whitespace".to_string(),
        ));
    }
    if source.trim().is_empty() || source.chars().count() > MAX_CODE_SOURCE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Code source must be between 1 and {MAX_CODE_SOURCE_LENGTH} characters"
        )));
    }
    Ok(())
}
