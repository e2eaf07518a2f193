//! Prelude module for convenient imports.

pub use crate::error::{Error, ErrorKind, Result};
pub use crate::handler::Handler;
pub use crate::locator::Locator;
pub use crate::request::{LookupDefaults, LookupRequest};
pub use crate::response::{DocumentPayload, LookupResponse, ResponseBody};
