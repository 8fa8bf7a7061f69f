//! Unit tests for the checkpoint crate.

use std::sync::Arc;

use sync_core::SyncError;
use tempfile::TempDir;

use crate::{CursorStore, FilesystemStore, MemoryStore};

// ============================================================================
// FilesystemStore Tests
// ============================================================================

#[tokio::test]
async fn test_filesystem_store_empty_dir() {
    let temp_dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(temp_dir.path().join("missing"));

    assert!(store.get().await.unwrap().is_none());
}

#[tokio::test]
async fn test_filesystem_store_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(temp_dir.path());

    store.set("tok-1").await.unwrap();
    let stored = store.get().await.unwrap().unwrap();
    assert_eq!(stored.cursor, "tok-1");
}

#[tokio::test]
async fn test_filesystem_store_overwrites_single_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(temp_dir.path());

    store.set("tok-1").await.unwrap();
    store.set("tok-2").await.unwrap();

    assert_eq!(store.get().await.unwrap().unwrap().cursor, "tok-2");

    let files: Vec<_> = std::fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    assert_eq!(files, vec!["sync_cursor.json".to_string()]);
}

#[tokio::test]
async fn test_filesystem_store_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let nested = temp_dir.path().join("a").join("b");
    let store = FilesystemStore::new(&nested);

    store.set("tok-1").await.unwrap();
    assert!(nested.join("sync_cursor.json").exists());
}

#[tokio::test]
async fn test_filesystem_store_corrupt_file() {
    let temp_dir = TempDir::new().unwrap();
    let store = FilesystemStore::new(temp_dir.path());
    std::fs::write(store.path(), "not json").unwrap();

    let err = store.get().await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidCursor(_)));
}

// ============================================================================
// MemoryStore Tests
// ============================================================================

#[tokio::test]
async fn test_memory_store_counts_writes() {
    let store = MemoryStore::with_cursor("tok-0");
    assert_eq!(store.writes(), 0);
    assert_eq!(store.get().await.unwrap().unwrap().cursor, "tok-0");

    store.set("tok-1").await.unwrap();
    store.set("tok-2").await.unwrap();
    assert_eq!(store.writes(), 2);
    assert_eq!(store.get().await.unwrap().unwrap().cursor, "tok-2");
}

#[tokio::test]
async fn test_arc_store_delegates() {
    let store = Arc::new(MemoryStore::new());
    let shared: Arc<MemoryStore> = Arc::clone(&store);

    shared.set("tok-1").await.unwrap();
    assert_eq!(store.writes(), 1);
    assert_eq!(
        CursorStore::get(&shared).await.unwrap().unwrap().cursor,
        "tok-1"
    );
}

#[tokio::test]
async fn test_memory_store_concurrent_readers_see_whole_values() {
    let store = Arc::new(MemoryStore::new());
    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            for i in 0..50 {
                store.set(&format!("tok-{i}")).await.unwrap();
            }
        })
    };
    for _ in 0..50 {
        if let Some(stored) = store.get().await.unwrap() {
            assert!(stored.cursor.starts_with("tok-"));
        }
    }
    writer.await.unwrap();
    assert_eq!(store.get().await.unwrap().unwrap().cursor, "tok-49");
}
