//! Common error type definitions.

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of errors that can occur in flowmend operations.
///
/// Validation and diff failures are reported as data and never use this type.
/// An [`Error`] means the caller broke a contract or a collaborator failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Input could not be interpreted.
    InvalidInput,
    /// Structurally nonsensical input, e.g. a workflow without a nodes array.
    Precondition,
    /// Resource not found.
    NotFound,
    /// Serialization/deserialization error.
    Serialization,
    /// A node-type lookup collaborator failed.
    Lookup,
    /// Internal error.
    InternalError,
}

/// A structured error type for flowmend operations.
#[derive(Debug, Error)]
#[error("{kind}{}", .message.as_ref().map(|m| format!(": {}", m)).unwrap_or_default())]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional error message.
    pub message: Option<String>,
    /// Optional source error.
    #[source]
    pub source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Adds a message to this error.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Adds a source error to this error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Creates a new invalid input error.
    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    /// Creates a new precondition error.
    pub fn precondition() -> Self {
        Self::new(ErrorKind::Precondition)
    }

    /// Creates a new not found error.
    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    /// Creates a new serialization error.
    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Creates a new lookup error.
    pub fn lookup() -> Self {
        Self::new(ErrorKind::Lookup)
    }

    /// Creates a new internal error.
    pub fn internal_error() -> Self {
        Self::new(ErrorKind::InternalError)
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization()
            .with_message(error.to_string())
            .with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = Error::precondition().with_message("workflow must have a nodes array");
        assert_eq!(
            error.to_string(),
            "precondition: workflow must have a nodes array"
        );
        assert_eq!(error.kind_str(), "precondition");
    }

    #[test]
    fn test_error_without_message() {
        let error = Error::lookup();
        assert_eq!(error.to_string(), "lookup");
        assert!(error.source.is_none());
    }

    #[test]
    fn test_from_serde_error() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = Error::from(parse);
        assert_eq!(error.kind(), ErrorKind::Serialization);
        assert!(error.source.is_some());
    }
}
