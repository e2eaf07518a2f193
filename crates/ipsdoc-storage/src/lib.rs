#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod backend;
mod config;
mod error;
#[cfg(any(test, feature = "test-utils"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-utils")))]
mod memory;
mod store;

#[doc(hidden)]
pub mod prelude;

pub use backend::OpendalStore;
pub use config::{BackendType, MAX_LIST_KEYS, StorageConfig};
pub use error::{StorageError, StorageResult};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::{Fault, MemoryStore};
pub use store::{ObjectEntry, ObjectStore};

/// Tracing target for storage operations.
pub const TRACING_TARGET: &str = "ipsdoc_storage";
