//! Product record store abstraction.
//!
//! This crate defines the `RecordStore` trait the sync engine writes
//! through and the reporting layer reads from. Records are keyed by the
//! source's `external_id`; the local surrogate id is assigned by the store.
//!
//! - `MemoryRecordStore` - In-process store for tests and dry runs
//! - `PostgresRecordStore` - The `products` table in PostgreSQL

mod memory;
mod postgres;
mod traits;

pub use memory::MemoryRecordStore;
pub use postgres::{connect, PostgresRecordStore};
pub use traits::{RecordStore, UpsertOutcome};
