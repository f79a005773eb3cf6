//! Application configuration.
//!
//! Compile-time defaults plus the runtime settings for the remote hazard
//! service. Secrets are never compiled in: the API key comes from the
//! environment (or a `.env` file) or is passed explicitly.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EnrichError;

/// Hazard service endpoint used when `HAZARD_API_URL` is not set.
pub const DEFAULT_HAZARD_ENDPOINT: &str = "https://vt8pmhgbpp.us-east-1.awsapprunner.com/api/hazards";

/// Per-request timeout for the hazard service.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum accepted upload size (in bytes).
///
/// 10 MB limit.
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Filename prefix for exported CSVs.
pub const OUTPUT_PREFIX: &str = "AWM-Hazard-Tool-Output";

/// Filename of the downloadable input template.
pub const TEMPLATE_FILENAME: &str = "AWM-Hazard-Tool-Template.csv";

/// Environment variable holding the bearer credential.
pub const API_KEY_VAR: &str = "HAZARD_API_KEY";

/// Environment variable overriding the endpoint.
pub const API_URL_VAR: &str = "HAZARD_API_URL";

/// Environment variable overriding the timeout, in seconds.
pub const API_TIMEOUT_VAR: &str = "HAZARD_API_TIMEOUT_SECS";

/// Which query parameters the hazard service expects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStyle {
    /// `latitude`, `longitude`, `standards`, `risk`
    #[default]
    Full,
    /// `lat`, `lon` only (two-column legacy service)
    Legacy,
}

/// Settings for [`crate::enrich::RemoteEnricher`].
#[derive(Clone)]
pub struct RemoteConfig {
    pub endpoint: String,
    pub api_key: String,
    pub timeout: Duration,
    pub query_style: QueryStyle,
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("query_style", &self.query_style)
            .finish()
    }
}

impl RemoteConfig {
    /// Config for the default endpoint with an explicit key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_HAZARD_ENDPOINT.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            query_style: QueryStyle::Full,
        }
    }

    /// Build from `HAZARD_API_KEY`, `HAZARD_API_URL` and
    /// `HAZARD_API_TIMEOUT_SECS`, loading `.env` first if present.
    pub fn from_env() -> Result<Self, EnrichError> {
        let _ = dotenvy::dotenv();

        let api_key = env::var(API_KEY_VAR)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(EnrichError::MissingApiKey)?;

        let mut config = Self::new(api_key);
        if let Ok(url) = env::var(API_URL_VAR) {
            if !url.trim().is_empty() {
                config.endpoint = url;
            }
        }
        if let Ok(raw) = env::var(API_TIMEOUT_VAR) {
            if let Some(timeout) = parse_timeout(&raw)? {
                config.timeout = timeout;
            }
        }
        Ok(config)
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_query_style(mut self, style: QueryStyle) -> Self {
        self.query_style = style;
        self
    }
}

/// Parse a timeout in whole seconds. Blank means "keep the default".
fn parse_timeout(raw: &str) -> Result<Option<Duration>, EnrichError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    match raw.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Some(Duration::from_secs(secs))),
        _ => Err(EnrichError::InvalidConfig(format!(
            "{} must be a positive number of seconds, got {:?}",
            API_TIMEOUT_VAR, raw
        ))),
    }
}
