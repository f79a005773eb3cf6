//! REST API types.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::PipelineError;
use crate::models::{EnrichedRow, ValidationViolation};
use crate::parser::HeaderMode;
use crate::pipeline::RunReport;

/// Response body format for `POST /api/process`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

/// Query string of `POST /api/process`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessQuery {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub header: HeaderMode,
}

/// Response sent after processing an uploaded CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    /// Unique job identifier
    pub job_id: String,

    /// "ready", "invalid" or "error"
    pub status: String,

    /// Enriched rows, empty unless status is "ready"
    pub rows: Vec<EnrichedRow>,

    /// Parse and validation violations, in input order
    pub violations: Vec<ValidationViolation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub metadata: ResponseMetadata,
}

/// Metadata about the run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub row_count: usize,
    pub usage_count: u64,
    pub enricher: String,
    pub encoding: Option<String>,
    pub header: Option<Vec<String>>,
    /// 1-based row whose enrichment failed
    pub failed_row: Option<usize>,
    /// HTTP status returned by the hazard service for the failed row
    pub upstream_status: Option<u16>,
}

impl ProcessResponse {
    fn base(status: &str) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: status.to_string(),
            rows: Vec::new(),
            violations: Vec::new(),
            error: None,
            metadata: ResponseMetadata::default(),
        }
    }

    /// Successful run.
    pub fn ready(report: RunReport) -> Self {
        let mut response = Self::base("ready");
        response.metadata = ResponseMetadata {
            row_count: report.rows.len(),
            usage_count: report.usage_count,
            enricher: report.enricher.to_string(),
            encoding: report.encoding,
            header: report.header,
            failed_row: None,
            upstream_status: None,
        };
        response.rows = report.rows;
        response
    }

    /// Run ended in a pipeline error.
    pub fn from_error(err: &PipelineError, usage_count: u64, enricher: &str) -> Self {
        let mut response = match err {
            PipelineError::Invalid { violations } => {
                let mut r = Self::base("invalid");
                r.violations = violations.clone();
                r
            }
            _ => Self::base("error"),
        };
        response.error = Some(err.to_string());
        response.metadata.usage_count = usage_count;
        response.metadata.enricher = enricher.to_string();
        if let PipelineError::Enrichment { row, source, .. } = err {
            response.metadata.failed_row = Some(*row);
            response.metadata.upstream_status = source.status();
        }
        response
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "rows": [],
        "violations": [],
    })
}
