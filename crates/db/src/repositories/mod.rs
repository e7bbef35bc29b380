//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod code_repo;
pub mod email_repo;
pub mod file_repo;
pub mod history_repo;
pub mod item_repo;
pub mod note_repo;

pub use code_repo::CodeRepo;
pub use email_repo::EmailRepo;
pub use file_repo::FileRepo;
pub use history_repo::HistoryRepo;
pub use item_repo::ItemRepo;
pub use note_repo::NoteRepo;
