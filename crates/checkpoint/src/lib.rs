//! Resume cursor storage for catalog-sync
//!
//! A sync run resumes from the cursor the source handed out at the end of
//! the last fully drained page chain. This crate keeps that one value.
//!
//! ## Storage Backends
//!
//! - `FilesystemStore` - Stores the cursor as a JSON file
//! - `PostgresStore` - Stores the cursor in a singleton `sync_state` row
//! - `MemoryStore` - Keeps the cursor in process memory

mod filesystem;
mod memory;
mod postgres;
pub mod store;

#[cfg(test)]
mod tests;

// Re-export store trait and types
pub use store::{CursorStore, StoredCursor};

// Re-export storage implementations
pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
