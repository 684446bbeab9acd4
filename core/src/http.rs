//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain owned data. The validator builds an
//! `HttpRequest` and parses an `HttpResponse`; whoever sits in between
//! (a `Transport`, or a C host through the FFI crate) performs the I/O.
//!
//! The validation call is always a POST, so `HttpRequest` has no method field.

/// An outbound validation request described as plain data.
///
/// Built by `LtiValidator::build_validation_request`. Must be sent as a POST
/// to `url` with `body` as the request entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpRequest {
    /// Look up a header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Error statuses (4xx/5xx) are ordinary responses here; only a failure to
/// complete the exchange is a `TransportError`. The body is kept as raw
/// bytes so that undecodable content is judged by the validator, not lost in
/// transit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
