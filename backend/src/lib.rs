//! # Hazardtool - site CSV validation and hazard enrichment
//!
//! Hazardtool reads a CSV of site coordinates with their building-code
//! parameters, checks every row against the rule catalog, attaches
//! per-hazard values to each valid row, and writes the result back out as
//! CSV.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   CSV File  │────▶│   Parser    │────▶│  Validator  │────▶│  Enricher   │────▶│  CSV / JSON │
//! │  (ISO/UTF8) │     │ (5 columns) │     │ (rule cat.) │     │(mock/remote)│     │   output    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hazardtool::{HeaderMode, MockEnricher, Pipeline};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut pipeline = Pipeline::new(MockEnricher::new());
//!     let report = pipeline.run("34.0522,-118.2437,7-22,2,D", HeaderMode::Auto).await.unwrap();
//!     println!("Enriched {} rows", report.rows.len());
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Rows, violations, hazard values
//! - [`catalog`] - Standards versions, risk levels, site classes
//! - [`parser`] - CSV row splitting and input decoding
//! - [`validation`] - Row and batch validation
//! - [`enrich`] - Mock and remote hazard enrichers
//! - [`pipeline`] - Parse → Validate → Enrich orchestration
//! - [`export`] - CSV output, template, filenames
//! - [`config`] - Defaults and remote service settings
//! - [`api`] - HTTP API server

// Core modules
pub mod config;
pub mod error;
pub mod models;

// Reference data
pub mod catalog;

// Parsing
pub mod parser;

// Validation
pub mod validation;

// Enrichment
pub mod enrich;

// Orchestration
pub mod pipeline;

// Output
pub mod export;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CsvError, EnrichError, PipelineError, ServerError};

pub use models::{
    CandidateRow, EnrichedRow, Field, HazardKey, HazardValueSet, ValidationViolation, NOT_AVAILABLE,
};

pub use catalog::{RuleCatalog, RULE_CATALOG};

pub use parser::{decode_bytes_auto, parse_rows, HeaderMode, ParseOutcome};

pub use validation::{validate_all, validate_batch, validate_row};

pub use enrich::{Enricher, HazardEnricher, MockEnricher, RemoteEnricher};

pub use pipeline::{check_input, Pipeline, PipelineState, RunReport};

pub use export::{encode_output, encode_rows, output_filename, template_csv, Column, OUTPUT_COLUMNS};

pub use config::{QueryStyle, RemoteConfig};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
