//! JSON envelope shared by the item, history, and attachment handlers.
//!
//! Successful bodies are `{ "data": ... }`; failures are rendered by
//! [`AppError`](crate::error::AppError) as `{ "error", "code" }`.

use serde::Serialize;

/// `{ "data": T }` wrapper around a handler's payload.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
