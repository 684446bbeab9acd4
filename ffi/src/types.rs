//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! enums with explicit discriminants. JSON maps cross the boundary as JSON
//! text. Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use lti_validator::{HttpRequest, Validation, ValidationError};
use serde_json::{Map, Value};

/// Opaque handle to an `LtiValidator`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiLtiValidator {
    pub(crate) inner: lti_validator::LtiValidator,
}

/// Allocate a C string, dropping interior NULs rather than failing.
pub(crate) fn c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') { s.replace('\0', "") } else { s };
    CString::new(s).unwrap_or_default().into_raw()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// The validation POST described as C-compatible plain data.
///
/// The C caller POSTs `body` to `url` with the listed headers and passes the
/// response back through `lti_parse_validation_response`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = c_string(req.url);
        let body = c_string(req.body);

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing the request.
/// The FFI layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Outcome codes returned in `FfiValidationResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    TransportFailure = 1,
    MalformedResponse = 2,
    ValidationRejected = 3,
    Panic = 4,
    NullArg = 5,
}

/// Result envelope for a validation.
///
/// On success `error_code` is `Ok`, `error_message` is null and `body` holds
/// the service's JSON response. On `ValidationRejected`, `body` holds the
/// rejecting response; for every other failure it is null. `http_status` is
/// the received status (400 for transport failures, 0 for `Panic`/`NullArg`).
#[repr(C)]
pub struct FfiValidationResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub body: *mut c_char,
}

fn json_text(body: Map<String, Value>) -> *mut c_char {
    c_string(Value::Object(body).to_string())
}

impl FfiValidationResult {
    pub(crate) fn ok(validation: Validation) -> *mut Self {
        let (status, body) = validation.into_parts();
        Box::into_raw(Box::new(FfiValidationResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: status,
            body: json_text(body),
        }))
    }

    /// Build an error result from a `ValidationError`.
    pub(crate) fn from_error(err: ValidationError) -> *mut Self {
        let http_status = err.status();
        let (error_code, message, body) = match err {
            ValidationError::TransportFailure { message } => {
                (FfiErrorCode::TransportFailure, message, std::ptr::null_mut())
            }
            ValidationError::MalformedResponse { message, .. } => {
                (FfiErrorCode::MalformedResponse, message, std::ptr::null_mut())
            }
            ValidationError::ValidationRejected { message, body, .. } => {
                (FfiErrorCode::ValidationRejected, message, json_text(body))
            }
        };

        Box::into_raw(Box::new(FfiValidationResult {
            error_code,
            error_message: c_string(message),
            http_status,
            body,
        }))
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, msg.to_string())
    }

    fn failure(error_code: FfiErrorCode, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiValidationResult {
            error_code,
            error_message: c_string(msg),
            http_status: 0,
            body: std::ptr::null_mut(),
        }))
    }
}
