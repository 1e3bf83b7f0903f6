//! Storage abstraction trait
//!
//! This module defines the `StorageGateway` trait that all storage backends
//! must implement. The upload orchestrator and the verification engine only
//! ever see this trait, so backends can be swapped and mocked per test.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Which backend a gateway is backed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    S3,
    Local,
}

/// Outcome of a successful `put`.
#[derive(Debug, Clone)]
pub struct PutOutcome {
    /// Resolvable URL/URI of the stored object.
    pub location: String,
    pub etag: Option<String>,
}

/// Metadata returned by `head`.
#[derive(Debug, Clone)]
pub struct ObjectHead {
    /// Content type as recorded by the backend, when it tracks one.
    pub content_type: Option<String>,
    pub size_bytes: u64,
    pub etag: Option<String>,
}

/// Durable object store abstraction.
///
/// Objects are write-once: a re-upload always goes to a fresh key. Presigned
/// URLs are the only time-bounded resources issued here.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Store an object under `key` and return its resolvable location.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> StorageResult<PutOutcome>;

    /// Download an object by its storage key.
    async fn download(&self, key: &str) -> StorageResult<Vec<u8>>;

    /// Generate a time-bounded URL permitting a GET of this object without
    /// caller credentials.
    async fn presign_download(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Generate a time-bounded URL permitting a direct PUT to this key with
    /// the given content type. Only supported by S3 backends; others return
    /// a `ConfigError`.
    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Fetch object metadata without downloading the body.
    async fn head(&self, key: &str) -> StorageResult<ObjectHead>;

    /// Delete an object by its storage key.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
