//! Storage backends holding carousel blobs and the index document.
//!
//! Two interchangeable implementations exist: [`LocalBackend`] (flat
//! directory on disk) and [`S3Backend`] (any S3-compatible endpoint via
//! the `object_store` crate). Registry logic is written against the
//! [`StorageBackend`] trait only and never branches on backend identity.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

pub mod local;
pub mod s3;

pub use local::LocalBackend;
pub use s3::S3Backend;

/// Where a stored object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLocation {
    /// The backend key the object is addressable under.
    pub key: String,
    /// Backend-provided public URL, when the backend has one. The local
    /// backend always reports `None`; display paths for it are derived
    /// from the key by the caller.
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid object key `{0}`")]
    InvalidKey(String),
    #[error("storage backend unavailable: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage backend unavailable: {0}")]
    ObjectStore(#[from] object_store::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Capability set shared by both storage variants.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// No caching, and callers must not assume partial success: a failed
/// call leaves them unable to tell what, if anything, was applied.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write an object, overwriting any previous content under `key`.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str)
    -> BackendResult<StoredLocation>;

    /// Read an object. `None` when the key does not exist.
    async fn get(&self, key: &str) -> BackendResult<Option<Bytes>>;

    /// Delete an object. Idempotent: deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> BackendResult<()>;

    /// List objects whose key starts with `prefix`, sorted by key.
    async fn list(&self, prefix: &str) -> BackendResult<Vec<StoredLocation>>;
}

/// Reject keys that could escape the backend's namespace.
///
/// Keys generated by the registry are already sanitized; this guards the
/// paths where a key arrives from the outside (image GET, delete).
pub(crate) fn ensure_key_safe(key: &str) -> BackendResult<()> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains("..")
        || key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
    {
        return Err(BackendError::InvalidKey(key.to_string()));
    }
    Ok(())
}
