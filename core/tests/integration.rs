//! Validation round-trips against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port and validates launches over real
//! HTTP through `UreqTransport`, covering every outcome the validator can
//! produce.

#![cfg(feature = "ureq")]

use std::io::{BufRead, BufReader, Read, Write};
use std::net::SocketAddr;

use lti_validator::{LtiValidator, UreqTransport, ValidatorConfig, ValidationError};
use serde_json::{json, Map, Value};

const LAUNCH_URI: &str = "https://localhost:9000/lti/";

fn start_server() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

fn basic_launch() -> Map<String, Value> {
    json!({
        "lti_message_type": "basic-lti-launch-request",
        "lti_version": "LTI-1p0",
        "resource_link_id": "429785226",
        "oauth_consumer_key": "34",
        "oauth_timestamp": "213",
    })
    .as_object()
    .cloned()
    .unwrap()
}

#[test]
fn validation_outcomes() {
    let addr = start_server();
    let config = ValidatorConfig::new(format!("http://{addr}/validate/lti"), "1").with_timeout_secs(10);
    let transport = UreqTransport::from_config(&config);

    // Accepted launch: status and the full body come back.
    let validator = LtiValidator::from_config(&config);
    let (status, body) = validator
        .validate(&transport, LAUNCH_URI, "POST", &basic_launch())
        .unwrap()
        .into_parts();
    assert_eq!(status, 200);
    assert_eq!(body["valid"], true);
    assert_eq!(body["consumerKey"], "34");
    assert_eq!(body["method"], "POST");

    // The launch method is data; GET launches validate the same way.
    let (_, body) = validator
        .validate(&transport, LAUNCH_URI, "GET", &basic_launch())
        .unwrap()
        .into_parts();
    assert_eq!(body["method"], "GET");

    // Missing launch parameter: rejected with the server's message.
    let mut payload = basic_launch();
    payload.remove("lti_version");
    let err = validator
        .validate(&transport, LAUNCH_URI, "POST", &payload)
        .unwrap_err();
    assert_eq!(err.message(), "Missing required launch parameter: lti_version");
    assert_eq!(err.status(), 400);
    assert_eq!(err.context().unwrap()["valid"], false);

    // Unknown application key.
    let stranger = LtiValidator::new(format!("http://{addr}/validate/lti"), "not-registered");
    let err = stranger
        .validate(&transport, LAUNCH_URI, "POST", &basic_launch())
        .unwrap_err();
    assert!(matches!(err, ValidationError::ValidationRejected { status: 401, .. }));
    assert_eq!(err.message(), "Unknown application key");

    // A server that rejects without an error field.
    let silent = LtiValidator::new(format!("http://{addr}/validate/silent"), "1");
    let err = silent
        .validate(&transport, LAUNCH_URI, "POST", &basic_launch())
        .unwrap_err();
    assert_eq!(err.message(), "Server has not provided an error message");
    assert_eq!(err.status(), 400);

    // A non-JSON body keeps the status that was actually received.
    let garbled = LtiValidator::new(format!("http://{addr}/validate/garbled"), "1");
    let err = garbled
        .validate(&transport, LAUNCH_URI, "POST", &basic_launch())
        .unwrap_err();
    assert!(matches!(err, ValidationError::MalformedResponse { status: 502, .. }));

    // Unrouted path: axum answers 404 with an empty body.
    let lost = LtiValidator::new(format!("http://{addr}/nowhere"), "1");
    let err = lost
        .validate(&transport, LAUNCH_URI, "POST", &basic_launch())
        .unwrap_err();
    assert!(matches!(err, ValidationError::MalformedResponse { status: 404, .. }));
}

#[test]
fn refused_connection_is_transport_failure() {
    // Bind then drop so the port is known to be closed.
    let addr = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap();

    let validator = LtiValidator::new(format!("http://{addr}/validate/lti"), "1");
    let err = validator
        .validate(&UreqTransport::default(), LAUNCH_URI, "POST", &basic_launch())
        .unwrap_err();
    assert!(matches!(err, ValidationError::TransportFailure { .. }));
    assert_eq!(err.status(), 400);
    assert!(!err.message().is_empty());
    assert!(err.context().is_none());
}

/// Serve one canned HTTP/1.1 response on a random port, after reading the
/// whole request so the client never sees a reset.
fn serve_once(status_line: &'static str, body: &'static [u8]) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream);
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap();
                }
            }
        }
        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).unwrap();

        let mut stream = reader.into_inner();
        let head = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).unwrap();
        stream.write_all(body).unwrap();
        stream.flush().unwrap();
    });

    addr
}

#[test]
fn undecodable_body_is_malformed_with_received_status() {
    let addr = serve_once("HTTP/1.1 200 OK", b"\xff\xfe not json");

    let validator = LtiValidator::new(format!("http://{addr}/validate/lti"), "1");
    let err = validator
        .validate(&UreqTransport::default(), LAUNCH_URI, "POST", &basic_launch())
        .unwrap_err();
    assert!(
        matches!(err, ValidationError::MalformedResponse { status: 200, .. }),
        "unexpected outcome: {err:?}"
    );
}

#[test]
fn invalid_utf8_inside_valid_looking_body_is_malformed() {
    let addr = serve_once("HTTP/1.1 200 OK", b"{\"valid\":true,\"x\":\"\xff\"}");

    let validator = LtiValidator::new(format!("http://{addr}/validate/lti"), "1");
    let err = validator
        .validate(&UreqTransport::default(), LAUNCH_URI, "POST", &basic_launch())
        .unwrap_err();
    assert!(matches!(err, ValidationError::MalformedResponse { status: 200, .. }));
}

#[test]
fn body_over_limit_is_transport_failure() {
    let addr = serve_once("HTTP/1.1 200 OK", b"{\"valid\": true, \"padding\": \"0123456789\"}");

    let validator = LtiValidator::new(format!("http://{addr}/validate/lti"), "1");
    let transport = UreqTransport::default().with_body_limit(8);
    let err = validator
        .validate(&transport, LAUNCH_URI, "POST", &basic_launch())
        .unwrap_err();
    assert!(matches!(err, ValidationError::TransportFailure { .. }));
    assert_eq!(err.status(), 400);
}
