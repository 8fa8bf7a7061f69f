//! Cursor storage trait and types
//!
//! This module defines the CursorStore trait for backend-agnostic
//! resume cursor storage, plus the persisted record.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sync_core::Result;

/// The persisted resume cursor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCursor {
    /// Opaque continuation token or URL handed out by the source
    pub cursor: String,
    /// When the cursor was last written
    pub updated_at: DateTime<Utc>,
}

impl StoredCursor {
    pub fn new(cursor: impl Into<String>) -> Self {
        Self {
            cursor: cursor.into(),
            updated_at: Utc::now(),
        }
    }
}

/// Trait for the singleton cursor.
///
/// There is at most one cursor per store. `set` replaces it in place and
/// readers never observe a partially written value.
///
/// Implementations:
/// - Filesystem storage (`FilesystemStore`)
/// - PostgreSQL (`PostgresStore`)
/// - In-process memory (`MemoryStore`)
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Read the cursor.
    ///
    /// Returns None if no chain has completed yet.
    async fn get(&self) -> Result<Option<StoredCursor>>;

    /// Replace the cursor.
    async fn set(&self, cursor: &str) -> Result<()>;
}

#[async_trait]
impl<T: CursorStore + ?Sized> CursorStore for std::sync::Arc<T> {
    async fn get(&self) -> Result<Option<StoredCursor>> {
        (**self).get().await
    }

    async fn set(&self, cursor: &str) -> Result<()> {
        (**self).set(cursor).await
    }
}
