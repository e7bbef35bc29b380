//! Domain logic for the repair-shop inventory tree.
//!
//! Everything here is free of database dependencies so it can be unit tested
//! in isolation and shared by the repository and HTTP layers.

pub mod attachments;
pub mod error;
pub mod history;
pub mod search;
pub mod storage;
pub mod tree;
pub mod types;
