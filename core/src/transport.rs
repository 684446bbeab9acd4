//! The HTTP capability the validator is handed.
//!
//! # Design
//! `LtiValidator::validate` performs its single POST through a `Transport`
//! supplied by the caller instead of reaching for process-wide client state.
//! Timeouts and any other connection policy are therefore decided by whoever
//! constructs the transport.
//!
//! A transport reports HTTP error statuses as ordinary `HttpResponse`s. Only
//! a failure to complete the exchange is a `TransportError`.

use crate::http::{HttpRequest, HttpResponse};

/// Failure to complete an HTTP exchange. `Display` is the message verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }
}

/// Sends a validation request as an HTTP POST and returns the raw response.
pub trait Transport {
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse, TransportError>,
{
    fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        self(request)
    }
}

#[cfg(feature = "ureq")]
pub use self::ureq_transport::{UreqTransport, DEFAULT_BODY_LIMIT};

#[cfg(feature = "ureq")]
mod ureq_transport {
    use std::time::Duration;

    use super::{Transport, TransportError};
    use crate::config::ValidatorConfig;
    use crate::http::{HttpRequest, HttpResponse};

    /// Largest response body `UreqTransport` reads, in bytes.
    pub const DEFAULT_BODY_LIMIT: u64 = 10 * 1024 * 1024;

    /// Blocking transport backed by a `ureq::Agent`.
    ///
    /// ureq's automatic status-code-as-error behaviour is disabled so 4xx/5xx
    /// responses come back as data for the validator to interpret. The body
    /// is read as raw bytes up to `body_limit`; a longer body was never
    /// received in full and is reported as a `TransportError`.
    #[derive(Debug, Clone)]
    pub struct UreqTransport {
        agent: ureq::Agent,
        body_limit: u64,
    }

    impl UreqTransport {
        /// Build a transport with an explicit global timeout. `None` leaves
        /// the request unbounded.
        pub fn new(timeout: Option<Duration>) -> Self {
            let agent = ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(timeout)
                .build()
                .new_agent();
            Self {
                agent,
                body_limit: DEFAULT_BODY_LIMIT,
            }
        }

        pub fn with_body_limit(mut self, bytes: u64) -> Self {
            self.body_limit = bytes;
            self
        }

        pub fn body_limit(&self) -> u64 {
            self.body_limit
        }

        pub fn from_config(config: &ValidatorConfig) -> Self {
            Self::new(config.timeout())
        }
    }

    impl Default for UreqTransport {
        fn default() -> Self {
            Self::new(None)
        }
    }

    impl Transport for UreqTransport {
        fn post(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
            let mut builder = self.agent.post(&request.url);
            for (key, value) in &request.headers {
                builder = builder.header(key, value);
            }

            let mut response = builder
                .send(request.body.as_bytes())
                .map_err(|e| TransportError::new(e.to_string()))?;

            let status = response.status().as_u16();
            let headers = response
                .headers()
                .iter()
                .map(|(k, v)| {
                    (
                        k.as_str().to_string(),
                        v.to_str().unwrap_or_default().to_string(),
                    )
                })
                .collect();
            // A body that cannot be read is as incomplete as a dropped connection.
            // Decoding is left to the validator.
            let body = response
                .body_mut()
                .with_config()
                .limit(self.body_limit)
                .read_to_vec()
                .map_err(|e| TransportError::new(e.to_string()))?;

            Ok(HttpResponse {
                status,
                headers,
                body,
            })
        }
    }
}
