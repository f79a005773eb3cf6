//! Error types for the hazard enrichment pipeline.
//!
//! This module defines the error hierarchy used across the crate:
//!
//! - [`CsvError`] - Reading, decoding and encoding CSV text
//! - [`EnrichError`] - Remote hazard service failures
//! - [`PipelineError`] - Top-level orchestration errors
//! - [`ServerError`] - HTTP layer errors
//!
//! Row-level problems (wrong column count, out-of-range latitude, illegal
//! site class...) are not errors in this sense: they are collected as
//! [`crate::models::ValidationViolation`] values and surfaced together
//! through [`PipelineError::Invalid`].

use thiserror::Error;

use crate::models::ValidationViolation;

// =============================================================================
// CSV Errors
// =============================================================================

/// Errors while reading or writing CSV text.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read or write a file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode the uploaded bytes.
    #[error("Failed to decode input: {0}")]
    EncodingError(String),

    /// The CSV writer rejected a record.
    #[error("Failed to encode CSV: {0}")]
    EncodeError(String),
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::EncodeError(err.to_string())
    }
}

// =============================================================================
// Enrichment Errors
// =============================================================================

/// Errors from a hazard enricher.
///
/// Only the remote variant produces these; the mock variant never fails.
#[derive(Debug, Error)]
pub enum EnrichError {
    /// No API key configured for the remote service.
    #[error("Missing HAZARD_API_KEY environment variable")]
    MissingApiKey,

    /// A remote setting from the environment could not be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Transport-level failure (DNS, connect, timeout...).
    #[error("HTTP request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("Hazard service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The service answered with an empty body.
    #[error("Hazard service returned an empty body")]
    EmptyBody,

    /// The body was not JSON or did not match the response schema.
    #[error("Invalid hazard response: {0}")]
    InvalidResponse(String),
}

impl EnrichError {
    /// HTTP status carried by the error, if the service answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            EnrichError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Terminal outcomes of a pipeline run.
///
/// Returned by [`crate::pipeline::Pipeline::run`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input could not be read or decoded.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Parse and validation violations; nothing was enriched.
    #[error("Input has {} violation(s)", .violations.len())]
    Invalid { violations: Vec<ValidationViolation> },

    /// Enrichment of `row` (1-based) failed; later rows were not processed.
    #[error("Row {row} ({latitude}, {longitude}): enrichment failed after {completed} row(s): {source}")]
    Enrichment {
        row: usize,
        latitude: String,
        longitude: String,
        completed: usize,
        #[source]
        source: EnrichError,
    },
}

impl PipelineError {
    /// Violation list for an invalid batch, empty otherwise.
    pub fn violations(&self) -> &[ValidationViolation] {
        match self {
            PipelineError::Invalid { violations } => violations,
            _ => &[],
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Another run holds the pipeline.
    #[error("A processing run is already in progress")]
    Busy,

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for enrichment operations.
pub type EnrichResult<T> = Result<T, EnrichError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrichment_error_mentions_row_and_status() {
        let err = PipelineError::Enrichment {
            row: 3,
            latitude: "34.0522".into(),
            longitude: "-118.2437".into(),
            completed: 2,
            source: EnrichError::Status {
                status: 503,
                body: "unavailable".into(),
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("Row 3"));
        assert!(msg.contains("503"));
        assert!(msg.contains("34.0522"));
    }

    #[test]
    fn test_invalid_carries_violations() {
        let err = PipelineError::Invalid {
            violations: vec![ValidationViolation::new(0, "Row 1: bad")],
        };
        assert_eq!(err.violations().len(), 1);
        assert!(err.to_string().contains("1 violation"));
    }

    #[test]
    fn test_csv_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let pipeline_err: PipelineError = CsvError::from(io).into();
        assert!(pipeline_err.to_string().contains("missing.csv"));
    }

    #[test]
    fn test_status_accessor() {
        assert_eq!(EnrichError::EmptyBody.status(), None);
        let err = EnrichError::Status { status: 401, body: String::new() };
        assert_eq!(err.status(), Some(401));
    }
}
