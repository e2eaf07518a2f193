//! In-memory object store for testing.
//!
//! [`MemoryStore`] keeps objects per bucket in insertion order, so listings are
//! deterministic, and lets tests inject a [`Fault`] into any of the three
//! operations. It also counts calls, which makes "no store access happened"
//! assertions possible.
//!
//! # Feature Flag
//!
//! This module is only available when the `test-utils` feature is enabled:
//!
//! ```toml
//! [dev-dependencies]
//! ipsdoc-storage = { version = "...", features = ["test-utils"] }
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bytes::Bytes;

use crate::config::MAX_LIST_KEYS;
use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectEntry, ObjectStore};

/// A failure the fake store reports instead of serving a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// The object or bucket does not exist.
    NotFound,
    /// Access was refused, with the store's message.
    PermissionDenied(String),
    /// Transport or service failure, with the store's message.
    Unavailable(String),
}

impl Fault {
    /// `unavailable` builds the operation-specific error for [`Fault::Unavailable`].
    fn into_error(
        self,
        bucket: &str,
        key: &str,
        unavailable: fn(String) -> StorageError,
    ) -> StorageError {
        match self {
            Self::NotFound => StorageError::not_found(format!("{bucket}/{key}")),
            Self::PermissionDenied(msg) => StorageError::permission_denied(msg),
            Self::Unavailable(msg) => unavailable(msg),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    buckets: HashMap<String, Vec<(String, Bytes)>>,
    list_fault: Option<Fault>,
    get_faults: HashMap<String, Fault>,
    presign_fault: Option<Fault>,
    list_calls: usize,
    get_calls: usize,
    presign_calls: usize,
}

/// In-memory [`ObjectStore`] with fault injection.
///
/// Clones share state, so a test can keep a handle for assertions after moving
/// another into the code under test.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    max_keys: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            state: Arc::default(),
            max_keys: MAX_LIST_KEYS,
        }
    }

    /// Limits how many entries a single listing returns.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Adds an object and returns the store.
    pub fn with_object(self, bucket: &str, key: &str, data: impl Into<Bytes>) -> Self {
        self.put(bucket, key, data);
        self
    }

    /// Stores an object. Overwriting keeps the key's original listing position.
    pub fn put(&self, bucket: &str, key: &str, data: impl Into<Bytes>) {
        let data = data.into();
        let mut state = self.lock();
        let objects = state.buckets.entry(bucket.to_owned()).or_default();
        match objects.iter_mut().find(|(existing, _)| existing == key) {
            Some((_, existing)) => *existing = data,
            None => objects.push((key.to_owned(), data)),
        }
    }

    /// Makes every listing fail.
    pub fn fail_list(&self, fault: Fault) {
        self.lock().list_fault = Some(fault);
    }

    /// Makes reads of `key` fail.
    pub fn fail_get(&self, key: &str, fault: Fault) {
        self.lock().get_faults.insert(key.to_owned(), fault);
    }

    /// Makes every presign request fail.
    pub fn fail_presign(&self, fault: Fault) {
        self.lock().presign_fault = Some(fault);
    }

    /// Number of `list` calls served or failed so far.
    pub fn list_calls(&self) -> usize {
        self.lock().list_calls
    }

    /// Number of `get` calls served or failed so far.
    pub fn get_calls(&self) -> usize {
        self.lock().get_calls
    }

    /// Number of `presign` calls served or failed so far.
    pub fn presign_calls(&self) -> usize {
        self.lock().presign_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectEntry>> {
        let mut state = self.lock();
        state.list_calls += 1;

        if let Some(fault) = state.list_fault.clone() {
            return Err(fault.into_error(bucket, prefix, StorageError::list));
        }

        let Some(objects) = state.buckets.get(bucket) else {
            return Ok(Vec::new());
        };

        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .take(self.max_keys)
            .map(|(key, data)| ObjectEntry::new(key.clone()).with_size(data.len() as u64))
            .collect())
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        let mut state = self.lock();
        state.get_calls += 1;

        if let Some(fault) = state.get_faults.get(key).cloned() {
            return Err(fault.into_error(bucket, key, StorageError::read));
        }

        state
            .buckets
            .get(bucket)
            .and_then(|objects| objects.iter().find(|(existing, _)| existing == key))
            .map(|(_, data)| data.clone())
            .ok_or_else(|| StorageError::not_found(format!("{bucket}/{key}")))
    }

    async fn presign(&self, bucket: &str, key: &str, expires_in: Duration) -> StorageResult<String> {
        let mut state = self.lock();
        state.presign_calls += 1;

        if let Some(fault) = state.presign_fault.clone() {
            return Err(fault.into_error(bucket, key, StorageError::presign));
        }

        Ok(format!(
            "memory://{bucket}/{key}?expires_in={}",
            expires_in.as_secs()
        ))
    }
}
