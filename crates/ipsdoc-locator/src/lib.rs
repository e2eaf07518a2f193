#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;
mod handler;
mod locator;
mod request;
mod response;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};
pub use handler::Handler;
pub use locator::{DEFAULT_SHARE_EXPIRATION, Locator, matches_client};
pub use request::{DEFAULT_BUCKET_NAME, DEFAULT_PREFIX, LookupDefaults, LookupRequest, ResolvedRequest};
pub use response::{DocumentPayload, LookupResponse, ResponseBody};

/// Tracing target for key matching.
pub const TRACING_TARGET_FIND: &str = "ipsdoc_locator::find";
/// Tracing target for object retrieval and presigning.
pub const TRACING_TARGET_FETCH: &str = "ipsdoc_locator::fetch";
/// Tracing target for request handling.
pub const TRACING_TARGET_HANDLER: &str = "ipsdoc_locator::handler";
