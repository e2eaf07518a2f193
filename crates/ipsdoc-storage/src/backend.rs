//! OpenDAL-backed object store.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use opendal::Operator;
#[cfg(any(feature = "s3", feature = "memory", test))]
use opendal::services;
use tokio::sync::RwLock;

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig};
use crate::error::{StorageError, StorageResult};
use crate::store::{ObjectEntry, ObjectStore};

/// Object store that wraps one OpenDAL operator per bucket.
///
/// Operators are built on first use and kept for the life of the store. Clones
/// share the same operator cache.
#[derive(Clone)]
pub struct OpendalStore {
    config: StorageConfig,
    operators: Arc<RwLock<HashMap<String, Operator>>>,
}

impl OpendalStore {
    /// Creates a new store from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        config.validate()?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = %config.backend,
            region = %config.region,
            endpoint = ?config.endpoint,
            max_keys = config.max_keys,
            "Object store initialized"
        );

        Ok(Self {
            config,
            operators: Arc::default(),
        })
    }

    /// Returns the configuration for this store.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the operator for `bucket`, creating it on first use.
    pub async fn operator(&self, bucket: &str) -> StorageResult<Operator> {
        if let Some(operator) = self.operators.read().await.get(bucket) {
            return Ok(operator.clone());
        }

        let mut operators = self.operators.write().await;
        match operators.entry(bucket.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let operator = Self::create_operator(&self.config, bucket)?;

                tracing::debug!(
                    target: TRACING_TARGET,
                    backend = self.config.backend.as_str(),
                    bucket = %bucket,
                    "Operator created"
                );

                Ok(entry.insert(operator).clone())
            }
        }
    }

    /// Creates an OpenDAL operator for one bucket.
    #[allow(unused_variables, unreachable_patterns)]
    fn create_operator(config: &StorageConfig, bucket: &str) -> StorageResult<Operator> {
        if bucket.is_empty() {
            return Err(StorageError::init("bucket name must not be empty"));
        }

        match config.backend {
            #[cfg(feature = "s3")]
            BackendType::S3 => {
                let mut builder = services::S3::default()
                    .bucket(bucket)
                    .region(&config.region);

                if let Some(ref endpoint) = config.endpoint {
                    builder = builder.endpoint(endpoint);
                }

                if let Some(ref access_key_id) = config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }

                if let Some(ref secret_access_key) = config.secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }

                if let Some(ref session_token) = config.session_token {
                    builder = builder.session_token(session_token);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(any(test, feature = "memory"))]
            BackendType::Memory => Operator::new(services::Memory::default())
                .map(|op| op.finish())
                .map_err(|e| StorageError::init(e.to_string())),

            _ => Err(StorageError::init(format!(
                "backend '{}' is not supported with current features",
                config.backend.as_str()
            ))),
        }
    }
}

fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() || key.ends_with('/') {
        return Err(StorageError::invalid_path(format!(
            "'{key}' does not name an object"
        )));
    }
    Ok(())
}

impl From<opendal::Entry> for ObjectEntry {
    fn from(entry: opendal::Entry) -> Self {
        let (path, meta) = entry.into_parts();

        // Convert chrono DateTime to jiff Timestamp
        let last_modified = meta
            .last_modified()
            .and_then(|dt| jiff::Timestamp::from_second(dt.timestamp()).ok());

        Self {
            key: path,
            size: meta.content_length(),
            last_modified,
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for OpendalStore {
    fn name(&self) -> &'static str {
        self.config.backend.as_str()
    }

    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<ObjectEntry>> {
        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %bucket,
            prefix = %prefix,
            "Listing objects"
        );

        let operator = self.operator(bucket).await?;
        let lister = operator.lister_with(prefix).recursive(true).await?;

        // Single page: anything past `max_keys` is never read.
        let entries: Vec<opendal::Entry> = lister
            .take(self.config.max_keys)
            .try_collect()
            .await?;

        let objects: Vec<ObjectEntry> = entries
            .into_iter()
            .filter(|entry| entry.metadata().is_file())
            .map(ObjectEntry::from)
            .collect();

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %bucket,
            prefix = %prefix,
            count = objects.len(),
            "Listing complete"
        );

        Ok(objects)
    }

    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Bytes> {
        validate_key(key)?;

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %bucket,
            key = %key,
            "Reading object"
        );

        let operator = self.operator(bucket).await?;
        let data = operator.read(key).await?.to_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %bucket,
            key = %key,
            size = data.len(),
            "Object read complete"
        );

        Ok(data)
    }

    async fn presign(&self, bucket: &str, key: &str, expires_in: Duration) -> StorageResult<String> {
        validate_key(key)?;

        let operator = self.operator(bucket).await?;
        if !operator.info().full_capability().presign_read {
            return Err(StorageError::presign(format!(
                "backend '{}' cannot presign reads",
                self.name()
            )));
        }

        let request = operator.presign_read(key, expires_in).await?;

        tracing::debug!(
            target: TRACING_TARGET,
            bucket = %bucket,
            key = %key,
            expires_in_secs = expires_in.as_secs(),
            "Presigned URL generated"
        );

        Ok(request.uri().to_string())
    }
}

impl std::fmt::Debug for OpendalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpendalStore")
            .field("backend", &self.config.backend)
            .field("region", &self.config.region)
            .finish()
    }
}
