//! Domain types for the validation round-trip.
//!
//! # Design
//! These types are defined independently of the mock-server crate; the
//! integration tests catch any drift in the wire format between the two.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An incoming LTI launch, as received by the tool being launched.
///
/// `method` is the HTTP method of the original launch ("POST" or "GET" in
/// practice). It is forwarded as data and never checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub uri: String,
    pub method: String,
    pub payload: Map<String, Value>,
}

impl LaunchRequest {
    pub fn new(uri: impl Into<String>, method: impl Into<String>, payload: Map<String, Value>) -> Self {
        Self {
            uri: uri.into(),
            method: method.into(),
            payload,
        }
    }
}

/// A launch the validation service accepted.
///
/// `body` is the service's full JSON response, including `"valid": true` and
/// any additional fields it chose to return.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub status: u16,
    pub body: Map<String, Value>,
}

impl Validation {
    /// Consume into the `(status, body)` pair.
    pub fn into_parts(self) -> (u16, Map<String, Value>) {
        (self.status, self.body)
    }
}
