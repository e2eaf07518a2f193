//! Object store capability interface.

use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::StorageResult;

/// A single object returned by a listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    /// Full object key within the bucket.
    pub key: String,
    /// Object size in bytes, zero when the listing does not report it.
    pub size: u64,
    /// Last modification time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<jiff::Timestamp>,
}

impl ObjectEntry {
    /// Creates an entry with only a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: 0,
            last_modified: None,
        }
    }

    /// Sets the object size.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

/// The three object store operations the locator depends on.
///
/// Implementations address objects by bucket and key. Any store that can list
/// keys under a prefix, return an object's bytes, and issue a time-bounded read
/// URL can back the locator.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Short backend name used in logs (e.g. "s3", "memory").
    fn name(&self) -> &'static str;

    /// Lists objects under `prefix`, one page only, in store order.
    ///
    /// A prefix with no objects under it yields an empty vector, not an error.
    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectEntry>>;

    /// Returns the full content of the object at `key`.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes>;

    /// Returns a URL granting read access to `key` until `expires_in` elapses.
    async fn presign(&self, bucket: &str, key: &str, expires_in: Duration) -> StorageResult<String>;
}
