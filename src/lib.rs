//! Catalog Sync Library
//!
//! Synchronizes a product catalog from the Contentful sync API into a local
//! PostgreSQL store, and reads it back for listings and reports.
//!
//! # Features
//!
//! - Initial synchronization: full export when the local store is empty
//! - Incremental synchronization: delta pulls resumed from a stored cursor
//! - Soft deletes: removed entries are flagged, never dropped
//! - Reliable cursor commits: the cursor only advances at a fully drained page chain
//! - Reports: deleted share, price coverage, date ranges, most expensive products
//!
//! # Workspace Crates
//!
//! - `sync_core` - product model, queries, source contract and error taxonomy
//! - `checkpoint` - resume cursor storage (filesystem, PostgreSQL, memory)
//! - `product_store` - product record storage (PostgreSQL, memory)
//! - `catalog_sync_contentful_source` - the Contentful sync API client
//!
//! # CLI Usage
//!
//! ```bash
//! # One sync run
//! catalog-sync sync --space-id abc --access-token ... --content-type product \
//!   --database-url postgres://localhost/catalog
//!
//! # Sync every hour until Ctrl-C
//! catalog-sync watch --interval 1h ...
//!
//! # Second page of lamps under 50
//! catalog-sync products --name lamp --price-max 50 --page 2
//!
//! # Reports
//! catalog-sync report deleted
//! catalog-sync report top-priced --limit 5
//! catalog-sync report created-between --from 2024-01-01 --to 2024-02-01
//! ```

pub mod config;
pub mod reports;
pub mod schedule;
pub mod sync;
pub mod testing;

pub use config::{ContentfulOpts, CursorStoreKind, StoreOpts};
pub use schedule::{watch, WatchSummary};
pub use sync::{DrainReason, SyncEngine, SyncMode, SyncReport, SyncStats};

// Re-export workspace crates for convenience
pub use catalog_sync_contentful_source as contentful;
pub use checkpoint;
pub use product_store;
pub use sync_core;
