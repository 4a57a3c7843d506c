//! Error types for the sync layer.

use shadow_storage::StorageError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while reconciling or associating.
///
/// Missing posts, terms and taxonomies are not errors here; they surface as
/// empty results or skipped transitions.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
