//! Lookup error definitions.

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with the lookup [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of lookup failures, each with a fixed response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Required input is missing or empty. No store call was made.
    Validation,
    /// No object matched the client.
    NotFound,
    /// The store failed to return the matched object.
    Retrieval,
    /// Any other fault, including malformed events.
    Internal,
}

impl ErrorKind {
    /// Returns the status code reported for this kind.
    pub const fn status_code(self) -> u16 {
        match self {
            Self::Validation => 400,
            Self::NotFound => 404,
            Self::Retrieval | Self::Internal => 500,
        }
    }

    /// Returns whether the caller, rather than the service, is at fault.
    pub const fn is_client_error(self) -> bool {
        matches!(self, Self::Validation | Self::NotFound)
    }
}

/// A lookup failure carrying the message shown to callers.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Message placed in the response envelope.
    pub message: String,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Creates the not found error for a client without documents.
    pub fn no_documents(client_name: &str) -> Self {
        Self::new(
            ErrorKind::NotFound,
            format!("No PDF files found for client: {client_name}"),
        )
    }

    /// Creates a retrieval error from the store's diagnostic.
    pub fn retrieval(detail: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorKind::Retrieval,
            format!("Error retrieving PDF from S3: {detail}"),
        )
    }

    /// Creates an internal error from any fault description.
    pub fn internal(detail: impl std::fmt::Display) -> Self {
        Self::new(ErrorKind::Internal, format!("Lambda function error: {detail}"))
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the status code reported for this error.
    pub fn status_code(&self) -> u16 {
        self.kind.status_code()
    }
}
