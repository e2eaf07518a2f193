//! Prelude module for convenient imports.

pub use crate::backend::OpendalStore;
pub use crate::config::{BackendType, StorageConfig};
pub use crate::error::{StorageError, StorageResult};
#[cfg(any(test, feature = "test-utils"))]
pub use crate::memory::{Fault, MemoryStore};
pub use crate::store::{ObjectEntry, ObjectStore};
