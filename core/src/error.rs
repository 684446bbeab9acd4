//! Error types for the validation call.
//!
//! # Design
//! Each failure kind is its own variant carrying only the fields that make
//! sense for it. Callers that want to treat all three uniformly can use the
//! `message`, `status` and `context` accessors, which present the shared
//! (message, status code, context mapping) shape.

use serde_json::{Map, Value};

/// Status reported for a transport failure, where no HTTP status was received.
pub const TRANSPORT_FAILURE_STATUS: u16 = 400;

/// Message used when the service rejects a launch without an `error` field.
pub const MISSING_ERROR_MESSAGE: &str = "Server has not provided an error message";

/// Errors returned by `LtiValidator::validate` and
/// `LtiValidator::parse_validation_response`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The request could not be completed (connection, DNS, TLS, timeout...).
    #[error("{message}")]
    TransportFailure { message: String },

    /// A response arrived but its body is not a JSON object.
    #[error("{message}")]
    MalformedResponse { message: String, status: u16 },

    /// The service answered with an error status or did not mark the launch
    /// as valid.
    #[error("{message}")]
    ValidationRejected {
        message: String,
        status: u16,
        body: Map<String, Value>,
    },
}

impl ValidationError {
    /// Human-readable description of the failure.
    pub fn message(&self) -> &str {
        match self {
            ValidationError::TransportFailure { message }
            | ValidationError::MalformedResponse { message, .. }
            | ValidationError::ValidationRejected { message, .. } => message,
        }
    }

    /// HTTP status of the failed call; `TRANSPORT_FAILURE_STATUS` when the
    /// transport never produced one.
    pub fn status(&self) -> u16 {
        match self {
            ValidationError::TransportFailure { .. } => TRANSPORT_FAILURE_STATUS,
            ValidationError::MalformedResponse { status, .. }
            | ValidationError::ValidationRejected { status, .. } => *status,
        }
    }

    /// The parsed response body for a rejection. Transport and parse failures
    /// have an empty context, reported as `None`.
    pub fn context(&self) -> Option<&Map<String, Value>> {
        match self {
            ValidationError::ValidationRejected { body, .. } => Some(body),
            _ => None,
        }
    }

    /// Short machine-readable name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::TransportFailure { .. } => "transport_failure",
            ValidationError::MalformedResponse { .. } => "malformed_response",
            ValidationError::ValidationRejected { .. } => "validation_rejected",
        }
    }
}
