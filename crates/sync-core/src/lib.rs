//! Core types for the catalog-sync framework.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace:
//!
//! - [`Product`] / [`StoredProduct`] - The canonical product record and its stored form
//! - [`ProductFilter`] / [`PageRequest`] / [`Paginated`] - Read-side queries
//! - [`SourceClient`] / [`SourcePage`] / [`RequestDescriptor`] - The contract a
//!   content source implements for the sync engine
//! - [`SyncError`] - The error taxonomy for sync runs
//!
//! # Architecture
//!
//! ```text
//! sync-core (this crate)
//!    │
//!    ├─── checkpoint          (cursor store, depends on sync-core for errors)
//!    ├─── product-store       (record store over Product)
//!    ├─── contentful-source   (implements SourceClient for Contentful)
//!    └─── catalog-sync        (sync engine, reports, CLI)
//! ```

pub mod error;
pub mod product;
pub mod query;
pub mod source;

pub use error::{Result, SyncError};
pub use product::{Product, StoredProduct};
pub use query::{DeletedFilter, PageRequest, Paginated, ProductFilter};
pub use source::{RequestDescriptor, RequestKind, SourceClient, SourcePage};
