//! Client for the remote hazard service.
//!
//! One GET per row, bearer-authenticated. Expected body:
//!
//! ```json
//! { "seismic": { "value": 1.2 }, "wind": { "value": 95 }, ..., "responseCode": 200 }
//! ```
//!
//! Hazard keys missing from the body, and a missing `responseCode`, are
//! reported as `"N/A"`.

use reqwest::Client;
use serde_json::Value;

use super::HazardEnricher;
use crate::config::{QueryStyle, RemoteConfig};
use crate::error::{EnrichError, EnrichResult};
use crate::models::{CandidateRow, HazardValueSet, NOT_AVAILABLE};
use crate::validation::validate_hazard_response;

/// Longest error body kept in [`EnrichError::Status`].
const MAX_ERROR_BODY: usize = 500;

/// Hazard service client.
#[derive(Debug, Clone)]
pub struct RemoteEnricher {
    client: Client,
    config: RemoteConfig,
}

impl RemoteEnricher {
    /// Build a client with the configured timeout.
    pub fn new(config: RemoteConfig) -> EnrichResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| EnrichError::Request(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// Build from `HAZARD_API_KEY` / `HAZARD_API_URL`.
    pub fn from_env() -> EnrichResult<Self> {
        Self::new(RemoteConfig::from_env()?)
    }

    /// Query parameters sent for `row`.
    pub fn query_params(&self, row: &CandidateRow) -> Vec<(&'static str, String)> {
        match self.config.query_style {
            QueryStyle::Full => vec![
                ("latitude", row.latitude.clone()),
                ("longitude", row.longitude.clone()),
                ("standards", row.standards_version.clone()),
                ("risk", row.risk_level.clone()),
            ],
            QueryStyle::Legacy => vec![
                ("lat", row.latitude.clone()),
                ("lon", row.longitude.clone()),
            ],
        }
    }

    async fn fetch(&self, row: &CandidateRow) -> EnrichResult<HazardValueSet> {
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&self.query_params(row))
            .bearer_auth(&self.config.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| EnrichError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            // A body that cannot be read must not hide the status
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| EnrichError::Request(e.to_string()))?;

        parse_hazard_response(&body)
    }
}

impl HazardEnricher for RemoteEnricher {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn enrich(&self, row: &CandidateRow) -> Result<HazardValueSet, EnrichError> {
        self.fetch(row).await
    }
}

/// `Status` error with the body cut to [`MAX_ERROR_BODY`] bytes.
fn status_error(status: u16, mut body: String) -> EnrichError {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    EnrichError::Status { status, body }
}

/// Map a hazard service body to a [`HazardValueSet`].
pub fn parse_hazard_response(body: &str) -> EnrichResult<HazardValueSet> {
    if body.trim().is_empty() {
        return Err(EnrichError::EmptyBody);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| EnrichError::InvalidResponse(e.to_string()))?;

    validate_hazard_response(&value).map_err(|errors| EnrichError::InvalidResponse(errors.join("; ")))?;

    let response_code = value
        .get("responseCode")
        .and_then(Value::as_i64)
        .map(|c| c.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    Ok(HazardValueSet::from_fn(
        |key| {
            value
                .get(key.as_str())
                .and_then(|hazard| hazard.get("value"))
                .and_then(format_number)
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        },
        response_code,
    ))
}

fn format_number(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
