//! Validator configuration.
//!
//! The endpoint and application key are fixed for the lifetime of an
//! `LtiValidator`. The optional timeout is consumed by transports
//! (`UreqTransport::from_config`); when absent no timeout is applied.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ENDPOINT_ENV: &str = "LTI_VALIDATOR_ENDPOINT";
pub const APP_KEY_ENV: &str = "LTI_VALIDATOR_APP_KEY";
pub const TIMEOUT_ENV: &str = "LTI_VALIDATOR_TIMEOUT_SECS";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// URL the validation envelope is POSTed to, used verbatim.
    pub endpoint_url: String,
    /// Identifies this application to the validation service.
    pub app_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ValidatorConfig {
    pub fn new(endpoint_url: impl Into<String>, app_key: impl Into<String>) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            app_key: app_key.into(),
            timeout_secs: None,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Read configuration from `LTI_VALIDATOR_ENDPOINT`,
    /// `LTI_VALIDATOR_APP_KEY` and the optional `LTI_VALIDATOR_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint_url = lookup(ENDPOINT_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing(ENDPOINT_ENV))?;
        let app_key = lookup(APP_KEY_ENV).ok_or(ConfigError::Missing(APP_KEY_ENV))?;
        let timeout_secs = match lookup(TIMEOUT_ENV) {
            Some(raw) => Some(raw.trim().parse().map_err(|_| ConfigError::Invalid {
                name: TIMEOUT_ENV,
                value: raw.clone(),
            })?),
            None => None,
        };
        Ok(Self {
            endpoint_url,
            app_key,
            timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn reads_required_and_optional_vars() {
        let config = ValidatorConfig::from_lookup(lookup(&[
            (ENDPOINT_ENV, "https://ultima.example/validate/lti/"),
            (APP_KEY_ENV, "1"),
            (TIMEOUT_ENV, " 15 "),
        ]))
        .unwrap();
        assert_eq!(config.endpoint_url, "https://ultima.example/validate/lti/");
        assert_eq!(config.app_key, "1");
        assert_eq!(config.timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn timeout_is_optional() {
        let config = ValidatorConfig::from_lookup(lookup(&[
            (ENDPOINT_ENV, "http://localhost:3000/validate/lti"),
            (APP_KEY_ENV, "1"),
        ]))
        .unwrap();
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn missing_endpoint_is_an_error() {
        let err = ValidatorConfig::from_lookup(lookup(&[(APP_KEY_ENV, "1")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENDPOINT_ENV));
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let err = ValidatorConfig::from_lookup(lookup(&[
            (ENDPOINT_ENV, "http://localhost:3000/validate/lti"),
            (APP_KEY_ENV, "1"),
            (TIMEOUT_ENV, "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: TIMEOUT_ENV, .. }));
    }

    #[test]
    fn deserializes_without_timeout() {
        let config: ValidatorConfig =
            serde_json::from_str(r#"{"endpoint_url":"http://x/validate","app_key":"k"}"#).unwrap();
        assert_eq!(config, ValidatorConfig::new("http://x/validate", "k"));
    }
}
