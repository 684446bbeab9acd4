//! Request builder and response interpreter for the validation service.
//!
//! # Design
//! `LtiValidator` holds only the endpoint and app key and carries no mutable
//! state between calls. The round-trip is split into
//! `build_validation_request` and `parse_validation_response`; `validate`
//! runs one POST through a `Transport` between the two.

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ValidatorConfig;
use crate::error::{ValidationError, MISSING_ERROR_MESSAGE};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{LaunchRequest, Validation};

/// Stateless client for the LTI validation service.
///
/// Safe to share between threads; every call is independent.
#[derive(Debug, Clone)]
pub struct LtiValidator {
    endpoint: String,
    app_key: String,
}

impl LtiValidator {
    pub fn new(endpoint_url: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint_url.into(),
            app_key: app_key.into(),
        }
    }

    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(config.endpoint_url.clone(), config.app_key.clone())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Validate a launch with one POST through `transport`.
    ///
    /// Returns the service's status and full JSON body when it reports the
    /// launch as valid.
    pub fn validate<T: Transport + ?Sized>(
        &self,
        transport: &T,
        launch_uri: &str,
        http_method: &str,
        payload: &Map<String, Value>,
    ) -> Result<Validation, ValidationError> {
        let request = self.build_request(launch_uri, http_method, payload);
        debug!(endpoint = %self.endpoint, launch_uri, http_method, "sending validation request");

        let response = transport.post(&request).map_err(|e| {
            debug!(endpoint = %self.endpoint, error = %e, "validation request failed in transport");
            ValidationError::TransportFailure {
                message: e.into_message(),
            }
        })?;

        let outcome = self.parse_validation_response(response);
        match &outcome {
            Ok(validation) => debug!(status = validation.status, "launch validated"),
            Err(e) => debug!(status = e.status(), kind = e.kind(), error = e.message(), "launch not validated"),
        }
        outcome
    }

    /// Same as `validate`, taking the launch as a single value.
    pub fn validate_launch<T: Transport + ?Sized>(
        &self,
        transport: &T,
        launch: &LaunchRequest,
    ) -> Result<Validation, ValidationError> {
        self.validate(transport, &launch.uri, &launch.method, &launch.payload)
    }

    /// Build the POST carrying the validation envelope
    /// `{"appKey", "uri", "method", "payload"}`.
    pub fn build_validation_request(&self, launch: &LaunchRequest) -> HttpRequest {
        self.build_request(&launch.uri, &launch.method, &launch.payload)
    }

    fn build_request(&self, launch_uri: &str, http_method: &str, payload: &Map<String, Value>) -> HttpRequest {
        let mut envelope = Map::new();
        envelope.insert("appKey".to_string(), Value::String(self.app_key.clone()));
        envelope.insert("uri".to_string(), Value::String(launch_uri.to_string()));
        envelope.insert("method".to_string(), Value::String(http_method.to_string()));
        envelope.insert("payload".to_string(), Value::Object(payload.clone()));

        HttpRequest {
            url: self.endpoint.clone(),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Value::Object(envelope).to_string(),
        }
    }

    /// Interpret the service's answer.
    ///
    /// A body that is not a JSON object is `MalformedResponse`. A status of
    /// 400 or above, or anything other than `"valid": true`, is
    /// `ValidationRejected`.
    pub fn parse_validation_response(&self, response: HttpResponse) -> Result<Validation, ValidationError> {
        let status = response.status;
        let body: Map<String, Value> =
            serde_json::from_slice(&response.body).map_err(|e| ValidationError::MalformedResponse {
                message: e.to_string(),
                status,
            })?;

        if status >= 400 || body.get("valid") != Some(&Value::Bool(true)) {
            return Err(ValidationError::ValidationRejected {
                message: rejection_message(&body),
                status,
                body,
            });
        }

        Ok(Validation { status, body })
    }
}

/// The service's `error` field, or the stock message when it gave none.
fn rejection_message(body: &Map<String, Value>) -> String {
    match body.get("error") {
        Some(Value::String(message)) => message.clone(),
        None | Some(Value::Null) => MISSING_ERROR_MESSAGE.to_string(),
        Some(other) => other.to_string(),
    }
}
