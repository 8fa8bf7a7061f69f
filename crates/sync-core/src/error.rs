//! Error types for sync runs.

use thiserror::Error;

/// Errors that can occur while synchronizing the catalog.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Transport or HTTP failure talking to the content source (timeouts included).
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The content source rejected our credentials.
    #[error("source rejected credentials: {0}")]
    SourceUnauthorized(String),

    /// A single source item could not be mapped to a product.
    #[error("malformed item {}: {reason}", .id.as_deref().unwrap_or("<no id>"))]
    MalformedItem {
        /// Source identifier, when the item carried one.
        id: Option<String>,
        /// What was wrong with the item.
        reason: String,
    },

    /// The local record or cursor store failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A persisted cursor could not be read back.
    #[error("invalid cursor: {0}")]
    InvalidCursor(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

impl SyncError {
    /// Creates a `MalformedItem` error.
    pub fn malformed(id: Option<&str>, reason: impl Into<String>) -> Self {
        Self::MalformedItem {
            id: id.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Wraps a storage backend error.
    pub fn store(err: impl std::fmt::Display) -> Self {
        Self::StoreUnavailable(err.to_string())
    }

    /// Wraps a transport error.
    pub fn source(err: impl std::fmt::Display) -> Self {
        Self::SourceUnavailable(err.to_string())
    }

    /// Returns true if the next scheduled run may succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SyncError::SourceUnavailable(_) | SyncError::StoreUnavailable(_)
        )
    }
}

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
