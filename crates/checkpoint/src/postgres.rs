//! PostgreSQL cursor storage implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use sync_core::{Result, SyncError};
use tokio::sync::Mutex;
use tokio_postgres::Client;

use crate::store::{CursorStore, StoredCursor};

/// PostgreSQL implementation of CursorStore trait.
///
/// Stores the cursor in a one-row table. The `CHECK (id = 1)` constraint
/// keeps it a singleton and `set` is a single upsert statement.
pub struct PostgresStore {
    client: Arc<Mutex<Client>>,
}

impl PostgresStore {
    /// Create a new PostgresStore sharing an existing connection.
    pub fn new(client: Arc<Mutex<Client>>) -> Self {
        Self { client }
    }

    /// Create the `sync_state` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<()> {
        let client = self.client.lock().await;
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS sync_state (
                    id SMALLINT PRIMARY KEY CHECK (id = 1),
                    next_sync_cursor TEXT NOT NULL,
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
                )",
            )
            .await
            .map_err(SyncError::store)?;
        Ok(())
    }
}

#[async_trait]
impl CursorStore for PostgresStore {
    async fn get(&self) -> Result<Option<StoredCursor>> {
        let client = self.client.lock().await;
        let row = client
            .query_opt(
                "SELECT next_sync_cursor, updated_at FROM sync_state WHERE id = 1",
                &[],
            )
            .await
            .map_err(SyncError::store)?;

        Ok(row.map(|row| {
            let updated_at: DateTime<Utc> = row.get(1);
            StoredCursor {
                cursor: row.get(0),
                updated_at,
            }
        }))
    }

    async fn set(&self, cursor: &str) -> Result<()> {
        let client = self.client.lock().await;
        client
            .execute(
                "INSERT INTO sync_state (id, next_sync_cursor, updated_at)
                 VALUES (1, $1, now())
                 ON CONFLICT (id) DO UPDATE
                 SET next_sync_cursor = EXCLUDED.next_sync_cursor,
                     updated_at = EXCLUDED.updated_at",
                &[&cursor],
            )
            .await
            .map_err(SyncError::store)?;
        tracing::debug!("Stored sync cursor in sync_state");
        Ok(())
    }
}
