//! Client core for validating LTI launch requests against a remote service.
//!
//! # Overview
//! An incoming LTI launch (URI, method, launch parameters) is wrapped in a
//! JSON envelope, POSTed to the validation service, and the service's JSON
//! answer is mapped to either a `Validation` or a typed `ValidationError`.
//!
//! # Design
//! - `LtiValidator` is stateless: it holds only the endpoint and app key.
//! - The round-trip is split into `build_validation_request` (produces an
//!   `HttpRequest`) and `parse_validation_response` (consumes an
//!   `HttpResponse`), so the I/O boundary is explicit and a host can do the
//!   network call itself.
//! - `validate` composes both around a caller-supplied `Transport`. Timeouts
//!   belong to the transport, not to ambient global state.

pub mod config;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;
pub mod validator;

pub use config::{ConfigError, ValidatorConfig};
pub use error::{ValidationError, MISSING_ERROR_MESSAGE, TRANSPORT_FAILURE_STATUS};
pub use http::{HttpRequest, HttpResponse};
pub use transport::{Transport, TransportError};
#[cfg(feature = "ureq")]
pub use transport::{UreqTransport, DEFAULT_BODY_LIMIT};
pub use types::{LaunchRequest, Validation};
pub use validator::LtiValidator;
