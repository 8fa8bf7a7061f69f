//! In-process cursor storage.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use sync_core::Result;
use tokio::sync::RwLock;

use crate::store::{CursorStore, StoredCursor};

/// Keeps the cursor in memory. Used by tests and dry runs.
#[derive(Default)]
pub struct MemoryStore {
    cursor: RwLock<Option<StoredCursor>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `cursor`. Does not count as a write.
    pub fn with_cursor(cursor: impl Into<String>) -> Self {
        Self {
            cursor: RwLock::new(Some(StoredCursor::new(cursor))),
            writes: AtomicUsize::new(0),
        }
    }

    /// Number of `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CursorStore for MemoryStore {
    async fn get(&self) -> Result<Option<StoredCursor>> {
        Ok(self.cursor.read().await.clone())
    }

    async fn set(&self, cursor: &str) -> Result<()> {
        *self.cursor.write().await = Some(StoredCursor::new(cursor));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
