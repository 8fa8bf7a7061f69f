//! The contract between the sync engine and a content source.

use std::fmt;

use async_trait::async_trait;

use crate::error::Result;
use crate::product::Product;

/// Why a request is being made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Full export of every item.
    Initial,
    /// Delta fetch resuming from a persisted cursor.
    Continuation,
    /// Next page of the chain currently being drained.
    NextPage,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestKind::Initial => write!(f, "initial"),
            RequestKind::Continuation => write!(f, "continuation"),
            RequestKind::NextPage => write!(f, "next-page"),
        }
    }
}

/// A fully formed request the source client can fetch without further input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub kind: RequestKind,
    pub url: String,
}

impl RequestDescriptor {
    pub fn initial(url: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Initial,
            url: url.into(),
        }
    }

    pub fn continuation(url: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Continuation,
            url: url.into(),
        }
    }

    pub fn next_page(url: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::NextPage,
            url: url.into(),
        }
    }
}

/// One normalized page from the source.
///
/// Every source wire shape is reduced to this before the engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePage<I> {
    /// New or updated items, still in the source's native shape.
    pub new_items: Vec<I>,
    /// External ids the source reports as removed.
    pub deleted_ids: Vec<String>,
    /// Same-chain continuation. Takes precedence over `next_cursor`.
    pub next_page: Option<RequestDescriptor>,
    /// Resume cursor marking the end of the chain.
    pub next_cursor: Option<String>,
}

impl<I> SourcePage<I> {
    /// A page with nothing in it and no continuation.
    pub fn empty() -> Self {
        Self {
            new_items: Vec::new(),
            deleted_ids: Vec::new(),
            next_page: None,
            next_cursor: None,
        }
    }

    /// True when the page carries neither items nor deletions.
    pub fn is_empty(&self) -> bool {
        self.new_items.is_empty() && self.deleted_ids.is_empty()
    }

    /// Number of actionable entries on the page.
    pub fn len(&self) -> usize {
        self.new_items.len() + self.deleted_ids.len()
    }
}

/// A content source the sync engine can pull from.
///
/// `fetch_page` performs exactly one request. Transport failures and
/// timeouts surface as [`SyncError::SourceUnavailable`], rejected
/// credentials as [`SyncError::SourceUnauthorized`].
///
/// [`SyncError::SourceUnavailable`]: crate::SyncError::SourceUnavailable
/// [`SyncError::SourceUnauthorized`]: crate::SyncError::SourceUnauthorized
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// The source's native item shape.
    type Item: Send + Sync;

    /// Describes a full-export fetch.
    fn initial_request(&self) -> RequestDescriptor;

    /// Describes a delta fetch resuming from `cursor`.
    fn continuation_request(&self, cursor: &str) -> Result<RequestDescriptor>;

    /// Fetches one page.
    async fn fetch_page(&self, request: &RequestDescriptor) -> Result<SourcePage<Self::Item>>;

    /// Maps native items to products, one result per item.
    ///
    /// Missing optional fields map to `None` or empty collections. A missing
    /// id or name fails only that item.
    fn canonicalize(&self, items: &[Self::Item]) -> Vec<Result<Product>>;
}
