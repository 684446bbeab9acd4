//! C-ABI wrapper around `lti-validator-core`.
//!
//! # Overview
//! Lets a host written in any language with a C FFI build the validation
//! POST, perform it with its own HTTP stack, and hand the response back for
//! interpretation. The core is compiled without its ureq transport.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Launch payloads and response bodies cross as JSON text.
//! - A single `FfiValidationResult` conveys success and every failure kind.
//! - The C caller owns all returned pointers and must call the matching
//!   `lti_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::catch_unwind;

use lti_validator::{HttpResponse, LaunchRequest, ValidationError};
use serde_json::{Map, Value};

use types::*;

/// Borrow a C string as `&str`; `None` for null or invalid UTF-8.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives the
/// returned reference.
unsafe fn str_arg<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

// ---------------------------------------------------------------------------
// Validator lifecycle
// ---------------------------------------------------------------------------

/// Create a validator for `endpoint_url` identified by `app_key`.
///
/// Returns null if either argument is null or not UTF-8, or on panic.
/// The caller must free the returned pointer with `lti_validator_free`.
#[unsafe(no_mangle)]
pub extern "C" fn lti_validator_new(
    endpoint_url: *const c_char,
    app_key: *const c_char,
) -> *mut FfiLtiValidator {
    catch_unwind(|| {
        let (Some(endpoint), Some(key)) = (unsafe { str_arg(endpoint_url) }, unsafe { str_arg(app_key) }) else {
            return std::ptr::null_mut();
        };
        let validator = lti_validator::LtiValidator::new(endpoint, key);
        Box::into_raw(Box::new(FfiLtiValidator { inner: validator }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a validator created by `lti_validator_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn lti_validator_free(validator: *mut FfiLtiValidator) {
    if !validator.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(validator) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build / parse
// ---------------------------------------------------------------------------

/// Build the validation POST for a launch.
///
/// `payload_json` must be a JSON object of launch parameters. Returns null
/// if any argument is null, not UTF-8, or the payload is not a JSON object.
/// The caller must free the returned pointer with `lti_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn lti_build_validation_request(
    validator: *const FfiLtiValidator,
    launch_uri: *const c_char,
    http_method: *const c_char,
    payload_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if validator.is_null() {
            return std::ptr::null_mut();
        }
        let validator = unsafe { &*validator };
        let args = unsafe { (str_arg(launch_uri), str_arg(http_method), str_arg(payload_json)) };
        let (Some(uri), Some(method), Some(payload)) = args else {
            return std::ptr::null_mut();
        };
        let Ok(payload) = serde_json::from_str::<Map<String, Value>>(payload) else {
            return std::ptr::null_mut();
        };
        let launch = LaunchRequest::new(uri, method, payload);
        FfiHttpRequest::from_core(validator.inner.build_validation_request(&launch))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body is
/// treated as empty; the bytes are passed through undecoded.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        Vec::new()
    } else {
        unsafe { CStr::from_ptr(resp.body) }.to_bytes().to_vec()
    };
    HttpResponse::new(resp.status, body)
}

/// Interpret the validation service's response.
///
/// The caller must free the returned pointer with `lti_free_result`.
#[unsafe(no_mangle)]
pub extern "C" fn lti_parse_validation_response(
    validator: *const FfiLtiValidator,
    response: *const FfiHttpResponse,
) -> *mut FfiValidationResult {
    catch_unwind(|| {
        if validator.is_null() {
            return FfiValidationResult::null_arg("validator");
        }
        if response.is_null() {
            return FfiValidationResult::null_arg("response");
        }
        let validator = unsafe { &*validator };
        let resp = unsafe { &*response };
        match validator.inner.parse_validation_response(ffi_response_to_core(resp)) {
            Ok(validation) => FfiValidationResult::ok(validation),
            Err(e) => FfiValidationResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiValidationResult::panic("panic in lti_parse_validation_response"))
}

/// Report that the host could not complete the POST.
///
/// Produces the same `TransportFailure` result the core gives for a failed
/// transport, carrying `message` and status 400.
#[unsafe(no_mangle)]
pub extern "C" fn lti_transport_failure(message: *const c_char) -> *mut FfiValidationResult {
    catch_unwind(|| {
        if message.is_null() {
            return FfiValidationResult::null_arg("message");
        }
        let message = unsafe { CStr::from_ptr(message) }.to_string_lossy().into_owned();
        FfiValidationResult::from_error(ValidationError::TransportFailure { message })
    })
    .unwrap_or_else(|_| FfiValidationResult::panic("panic in lti_transport_failure"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by `lti_build_validation_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn lti_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free a result returned by `lti_parse_validation_response` or
/// `lti_transport_failure`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn lti_free_result(result: *mut FfiValidationResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        free_c_string(result.body);
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn lti_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
