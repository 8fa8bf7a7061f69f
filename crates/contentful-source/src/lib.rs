//! Contentful sync API source for catalog-sync.
//!
//! Implements [`sync_core::SourceClient`] against the Contentful Content
//! Delivery sync endpoint:
//!
//! - [`ContentfulConfig`] - space, credentials, content type and transport settings
//! - [`ContentfulClient`] - builds requests, fetches pages, canonicalizes entries
//! - [`wire`] - the response shapes the endpoint returns and their normalization
//!
//! # Page normalization
//!
//! The endpoint answers with either a flat `items` array or an object with
//! `newEntries` and `deletedEntries`. Both are reduced to one
//! [`sync_core::SourcePage`]:
//!
//! - flat array: `sys.type == "Entry"` (or no type) is a new item,
//!   `sys.type == "DeletedEntry"` contributes its `sys.id` to the deleted ids,
//!   anything else (assets, deleted assets) is ignored. A page holding only
//!   ignored types is therefore empty: the run ends there and the stored
//!   cursor is left as it was, still covering that page on the next run
//! - object form: `newEntries` are new items; `deletedEntries` may hold
//!   entry objects or bare id strings
//! - `nextPageUrl` becomes a next-page request; `nextSyncUrl` becomes the
//!   resume cursor, reduced to its `sync_token` value when it has one. Blank
//!   values of either are treated as absent
//! - each item deserializes on its own; a member of the wrong type reads as
//!   absent and the item then fails canonicalization by itself

mod client;
mod config;
mod conversion;
pub mod wire;

pub use client::ContentfulClient;
pub use config::ContentfulConfig;
pub use conversion::entry_to_product;
pub use wire::{extract_sync_token, Entry};
