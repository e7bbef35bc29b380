//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - Query parameter structs where the entity is listed with filters

pub mod code;
pub mod email;
pub mod file;
pub mod history;
pub mod item;
pub mod note;
