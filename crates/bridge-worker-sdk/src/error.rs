//! Error types for bridge handlers

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error produced by (or on behalf of) a handler invocation.
///
/// Carries the three fields the bridge's error endpoints expect: an error
/// kind, a human-readable message, and an ordered trace. Recoverable at the
/// worker level: a `HandlerError` is reported to the bridge and the
/// invocation loop moves on to the next event.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct HandlerError {
    /// Error classification (the wire `errorType`)
    pub kind: String,

    /// Human-readable description (the wire `errorMessage`)
    pub message: String,

    /// Ordered trace lines, oldest frame first
    pub trace: Vec<String>,
}

impl HandlerError {
    /// Create an error with an explicit kind
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            trace: Vec::new(),
        }
    }

    /// Create a generic error (kind `Error`), matching the default
    /// classification of uncaught handler failures
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }

    /// Attach a trace to the error
    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }
}

impl From<UnsupportedOperation> for HandlerError {
    fn from(err: UnsupportedOperation) -> Self {
        Self::new("UnsupportedOperation", err.to_string())
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        Self::new("SerializationError", err.to_string())
    }
}

/// Returned when a handler invokes a legacy execution-context member that
/// exists only for structural compatibility with the emulated runtime.
///
/// The local calling convention is value-returning, not callback-based, so
/// `done`/`fail`/`succeed` and writes to `callbackWaitsForEmptyEventLoop`
/// cannot be honored. Fatal to the handler's call path, not to the worker.
#[derive(Debug, Clone, Error)]
#[error("`{member}` on the execution context is not supported by the local invocation bridge")]
pub struct UnsupportedOperation {
    /// The context member that was invoked
    pub member: &'static str,
}

impl UnsupportedOperation {
    pub fn new(member: &'static str) -> Self {
        Self { member }
    }
}

/// Wire form of an error report, as posted to the bridge's
/// `/runtime/invocation/{id}/error` and `/runtime/init/error` endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "errorType")]
    pub error_type: String,

    #[serde(rename = "errorMessage")]
    pub error_message: String,

    pub trace: Vec<String>,
}

impl From<&HandlerError> for ErrorBody {
    fn from(err: &HandlerError) -> Self {
        Self {
            error_type: err.kind.clone(),
            error_message: err.message.clone(),
            trace: err.trace.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_wire_keys() {
        let body = ErrorBody::from(&HandlerError::error("boom"));
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"errorType":"Error","errorMessage":"boom","trace":[]}"#);
    }

    #[test]
    fn test_error_body_preserves_trace_order() {
        let err = HandlerError::error("boom")
            .with_trace(vec!["at top".to_string(), "at bottom".to_string()]);
        let body = ErrorBody::from(&err);
        assert_eq!(body.trace, vec!["at top", "at bottom"]);
    }

    #[test]
    fn test_unsupported_operation_converts_to_handler_error() {
        let err: HandlerError = UnsupportedOperation::new("done").into();
        assert_eq!(err.kind, "UnsupportedOperation");
        assert!(err.message.contains("`done`"));
    }
}
