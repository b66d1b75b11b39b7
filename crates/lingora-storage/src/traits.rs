//! Storage abstraction trait
//!
//! All storage backends must implement [`ObjectStorage`]. The media ledger
//! only ever creates a row after `push` has returned a usable identity, and
//! it tolerates `remove` failing without retrying (the accepted inconsistency
//! is an orphaned physical object, never a ledger row without an object).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lingora_core::models::ResourceKind;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Push failed: {0}")]
    PushFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage id: {0}")]
    InvalidId(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Local,
    Remote,
}

/// Per-push options. Video pushes are large-chunked by real backends and may
/// request asynchronous derived-rendition generation (`eager_renditions`);
/// renditions that arrive after the ledger write are merged into the existing
/// row, not recorded as a new asset.
#[derive(Debug, Clone)]
pub struct PushOptions {
    pub filename: String,
    pub content_type: String,
    pub kind: ResourceKind,
    pub eager_renditions: bool,
}

/// A derived rendition reported by the backend, either inline with the push
/// response or later through the out-of-band rendition channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedRendition {
    pub label: String,
    pub url: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// The identity and metadata a successful push returns. A ledger row may only
/// be created from one of these.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub storage_id: String,
    pub url: String,
    pub secure_url: String,
    pub format: Option<String>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub duration_seconds: Option<f64>,
    pub derived: Vec<DerivedRendition>,
}

/// Storage abstraction trait
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Push bytes to the backend and return the stored object's identity.
    async fn push(&self, options: &PushOptions, data: Vec<u8>) -> StorageResult<StoredObject>;

    /// Delete the physical object. Callers must tolerate failure and must not
    /// retry; ledger cleanup proceeds regardless of the outcome.
    async fn remove(&self, storage_id: &str, kind: ResourceKind) -> StorageResult<()>;

    /// Whether the backend still holds the object.
    async fn exists(&self, storage_id: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
