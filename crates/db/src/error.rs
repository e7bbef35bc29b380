use inventory_core::error::CoreError;

/// Error returned by repository operations that enforce domain rules.
///
/// Plain CRUD methods return `sqlx::Error` directly; the tree store and
/// attachment registry mutations also reject on domain grounds (missing
/// parent, circular move, invalid payload) and use this type instead.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
