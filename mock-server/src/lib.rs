//! In-memory stand-in for the LTI validation service.
//!
//! Checks the application key and the Basic Launch Data parameters of the
//! forwarded launch. No OAuth signature verification is performed.

use std::{collections::HashSet, sync::Arc};

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;

/// Application key accepted by `app()`.
pub const DEFAULT_APP_KEY: &str = "1";

/// Launch parameters every basic launch must carry.
pub const REQUIRED_LAUNCH_PARAMS: [&str; 4] = [
    "lti_message_type",
    "lti_version",
    "resource_link_id",
    "oauth_consumer_key",
];

pub const BASIC_LAUNCH_MESSAGE_TYPE: &str = "basic-lti-launch-request";

/// The body a client POSTs to `/validate/lti`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationEnvelope {
    pub app_key: String,
    pub uri: String,
    pub method: String,
    pub payload: Map<String, Value>,
}

pub type AppKeys = Arc<HashSet<String>>;

pub fn app() -> Router {
    app_with_keys([DEFAULT_APP_KEY])
}

pub fn app_with_keys<I, S>(keys: I) -> Router
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let keys: AppKeys = Arc::new(keys.into_iter().map(Into::into).collect());
    Router::new()
        .route("/validate/lti", post(validate_launch))
        .route("/validate/silent", post(silent))
        .route("/validate/garbled", post(garbled))
        .with_state(keys)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn validate_launch(
    State(keys): State<AppKeys>,
    Json(envelope): Json<ValidationEnvelope>,
) -> (StatusCode, Json<Value>) {
    match check_launch(&keys, &envelope) {
        Ok(()) => {
            tracing::info!(uri = %envelope.uri, method = %envelope.method, "launch accepted");
            (
                StatusCode::OK,
                Json(json!({
                    "valid": true,
                    "consumerKey": envelope.payload["oauth_consumer_key"],
                    "resourceLinkId": envelope.payload["resource_link_id"],
                    "method": envelope.method,
                })),
            )
        }
        Err((status, error)) => {
            tracing::info!(uri = %envelope.uri, %status, %error, "launch rejected");
            (status, Json(json!({"valid": false, "error": error})))
        }
    }
}

fn check_launch(keys: &AppKeys, envelope: &ValidationEnvelope) -> Result<(), (StatusCode, String)> {
    if !keys.contains(&envelope.app_key) {
        return Err((StatusCode::UNAUTHORIZED, "Unknown application key".to_string()));
    }
    if let Some(missing) = REQUIRED_LAUNCH_PARAMS
        .iter()
        .find(|name| !envelope.payload.contains_key(**name))
    {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("Missing required launch parameter: {missing}"),
        ));
    }
    match envelope.payload.get("lti_message_type") {
        Some(Value::String(kind)) if kind == BASIC_LAUNCH_MESSAGE_TYPE => Ok(()),
        _ => Err((
            StatusCode::BAD_REQUEST,
            format!("lti_message_type must be {BASIC_LAUNCH_MESSAGE_TYPE}"),
        )),
    }
}

/// A server that rejects without saying why.
async fn silent() -> (StatusCode, Json<Value>) {
    (StatusCode::BAD_REQUEST, Json(json!({})))
}

/// A gateway answering in plain text instead of JSON.
async fn garbled() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "upstream unavailable")
}
