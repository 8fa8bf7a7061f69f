//! Filesystem-based cursor storage implementation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use sync_core::{Result, SyncError};

use crate::store::{CursorStore, StoredCursor};

const CURSOR_FILE: &str = "sync_cursor.json";

/// Filesystem implementation of CursorStore trait.
///
/// Keeps the cursor as a single JSON file in a directory. Writes go to a
/// temporary sibling first and are renamed over the old file, so a reader
/// sees either the previous cursor or the new one.
pub struct FilesystemStore {
    dir: PathBuf,
}

impl FilesystemStore {
    /// Create a new FilesystemStore with the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Get the directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the cursor file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(CURSOR_FILE)
    }
}

#[async_trait]
impl CursorStore for FilesystemStore {
    async fn get(&self) -> Result<Option<StoredCursor>> {
        let path = self.path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(SyncError::store(format!("{}: {e}", path.display()))),
        };
        let stored: StoredCursor = serde_json::from_str(&content)
            .map_err(|e| SyncError::InvalidCursor(format!("{}: {e}", path.display())))?;
        Ok(Some(stored))
    }

    async fn set(&self, cursor: &str) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SyncError::store(format!("{}: {e}", self.dir.display())))?;

        let stored = StoredCursor::new(cursor);
        let json = serde_json::to_string_pretty(&stored).map_err(SyncError::store)?;

        let path = self.path();
        let tmp = self.dir.join(format!("{CURSOR_FILE}.tmp"));
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| SyncError::store(format!("{}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| SyncError::store(format!("{}: {e}", path.display())))?;

        tracing::info!("Stored sync cursor to {}", path.display());
        Ok(())
    }
}
