//! Storage configuration types.

use std::fmt;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::{StorageError, StorageResult};

/// Largest page S3 returns from a single `ListObjectsV2` request.
pub const MAX_LIST_KEYS: usize = 1000;

/// Storage backend selection.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    /// Amazon S3 or any S3-compatible service.
    #[default]
    #[display("s3")]
    S3,
    /// Process-local memory, for local runs without a cloud account.
    #[display("memory")]
    Memory,
}

impl BackendType {
    /// Returns the backend name as a static string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::S3 => "s3",
            Self::Memory => "memory",
        }
    }

    /// Returns whether this backend was compiled into the crate.
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::S3 => cfg!(feature = "s3"),
            Self::Memory => cfg!(any(test, feature = "memory")),
        }
    }
}

/// Object store connection settings.
///
/// There is no bucket field: the bucket arrives with every lookup request, and
/// the store opens one operator per bucket on first use.
///
/// # Environment Variables
///
/// - `STORAGE_BACKEND` - `s3` (default) or `memory`
/// - `AWS_REGION` - Region of the bucket (default: us-east-1)
/// - `S3_ENDPOINT` - Custom endpoint for S3-compatible services
/// - `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_SESSION_TOKEN` - Static credentials
/// - `LIST_MAX_KEYS` - Entries read from a listing (default: 1000)
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct StorageConfig {
    /// Storage backend to use.
    #[cfg_attr(
        feature = "config",
        arg(long = "storage-backend", env = "STORAGE_BACKEND", value_enum, default_value = "s3")
    )]
    #[serde(default)]
    pub backend: BackendType,

    /// AWS region.
    #[cfg_attr(
        feature = "config",
        arg(long = "aws-region", env = "AWS_REGION", default_value = "us-east-1")
    )]
    #[serde(default = "default_region")]
    pub region: String,

    /// Custom endpoint URL (for S3-compatible storage like MinIO, LocalStack).
    #[cfg_attr(feature = "config", arg(long = "s3-endpoint", env = "S3_ENDPOINT"))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// Access key ID.
    #[cfg_attr(
        feature = "config",
        arg(long = "aws-access-key-id", env = "AWS_ACCESS_KEY_ID", hide_env_values = true)
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,

    /// Secret access key.
    #[cfg_attr(
        feature = "config",
        arg(long = "aws-secret-access-key", env = "AWS_SECRET_ACCESS_KEY", hide_env_values = true)
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,

    /// Session token for temporary credentials (set by the Lambda environment).
    #[cfg_attr(
        feature = "config",
        arg(long = "aws-session-token", env = "AWS_SESSION_TOKEN", hide_env_values = true)
    )]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,

    /// Maximum number of entries read from a single listing.
    #[cfg_attr(
        feature = "config",
        arg(long = "list-max-keys", env = "LIST_MAX_KEYS", default_value_t = MAX_LIST_KEYS)
    )]
    #[serde(default = "default_max_keys")]
    pub max_keys: usize,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_max_keys() -> usize {
    MAX_LIST_KEYS
}

impl StorageConfig {
    /// Creates a new configuration for the given backend.
    pub fn new(backend: BackendType) -> Self {
        Self {
            backend,
            region: default_region(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
            session_token: None,
            max_keys: MAX_LIST_KEYS,
        }
    }

    /// Creates an S3 configuration for the given region.
    pub fn s3(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::new(BackendType::S3)
        }
    }

    /// Creates a process-local memory configuration.
    pub fn memory() -> Self {
        Self::new(BackendType::Memory)
    }

    /// Sets the custom endpoint (for S3-compatible storage).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the access credentials.
    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Sets the session token.
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    /// Sets the maximum number of entries read from a listing.
    pub fn with_max_keys(mut self, max_keys: usize) -> Self {
        self.max_keys = max_keys;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is not compiled in, the listing size is
    /// outside `1..=1000`, or only one half of the static credentials is set.
    pub fn validate(&self) -> StorageResult<()> {
        if !self.backend.is_enabled() {
            return Err(StorageError::init(format!(
                "backend '{}' is not supported with current features",
                self.backend
            )));
        }

        if self.max_keys == 0 || self.max_keys > MAX_LIST_KEYS {
            return Err(StorageError::init(format!(
                "max_keys {} is invalid, must be between 1 and {MAX_LIST_KEYS}",
                self.max_keys
            )));
        }

        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(StorageError::init(
                "access key id and secret access key must be provided together",
            ));
        }

        Ok(())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(BackendType::default())
    }
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("backend", &self.backend)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("static_credentials", &self.access_key_id.is_some())
            .field("session_token", &self.session_token.is_some())
            .field("max_keys", &self.max_keys)
            .finish()
    }
}
