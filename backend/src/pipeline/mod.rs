//! Parse → Validate → Enrich orchestration.
//!
//! A [`Pipeline`] owns one enricher, the last successful result set and a
//! usage counter. Runs are strictly sequential: `run` takes `&mut self`, so
//! a second run cannot start while one is in flight.
//!
//! ```text
//! Idle → Parsing → Validating ─┬─▶ Invalid            (violations, nothing enriched)
//!                              └─▶ Enriching ─┬─▶ EnrichFailed   (first failing row)
//!                                             └─▶ Done
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use hazardtool::enrich::MockEnricher;
//! use hazardtool::parser::HeaderMode;
//! use hazardtool::pipeline::Pipeline;
//!
//! let mut pipeline = Pipeline::new(MockEnricher::new());
//! let report = pipeline.run("34.0522,-118.2437,7-22,2,D", HeaderMode::Auto).await?;
//! assert_eq!(report.rows.len(), 1);
//! ```

use serde::Serialize;

use crate::api::logs::{log_error, log_info, log_row, log_success, log_warning, LogLevel};
use crate::enrich::HazardEnricher;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{CandidateRow, EnrichedRow, ValidationViolation};
use crate::parser::{decode_bytes_auto, parse_rows, HeaderMode};
use crate::validation::validate_all;

/// Where a pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PipelineState {
    Idle,
    Parsing,
    Validating,
    Invalid,
    Enriching,
    EnrichFailed,
    Done,
}

impl PipelineState {
    /// Whether a run has ended in this state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Invalid | PipelineState::EnrichFailed | PipelineState::Done
        )
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Enriched rows, same order and count as the validated input
    pub rows: Vec<EnrichedRow>,
    /// Successful enrichment calls made by this pipeline so far
    pub usage_count: u64,
    /// Header fields, if a header line was skipped
    pub header: Option<Vec<String>>,
    /// Detected input encoding, when the run started from bytes
    pub encoding: Option<String>,
    /// Enricher variant that produced the values
    pub enricher: &'static str,
}

type StateObserver = Box<dyn Fn(PipelineState) + Send + Sync>;

/// Sequential validation + enrichment pipeline.
pub struct Pipeline<E> {
    enricher: E,
    state: PipelineState,
    results: Vec<EnrichedRow>,
    usage_count: u64,
    observer: Option<StateObserver>,
}

impl<E: HazardEnricher> Pipeline<E> {
    pub fn new(enricher: E) -> Self {
        Self {
            enricher,
            state: PipelineState::Idle,
            results: Vec::new(),
            usage_count: 0,
            observer: None,
        }
    }

    /// Call `observer` on every state transition.
    pub fn on_state_change(mut self, observer: impl Fn(PipelineState) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Rows of the last successful run.
    pub fn results(&self) -> &[EnrichedRow] {
        &self.results
    }

    pub fn usage_count(&self) -> u64 {
        self.usage_count
    }

    pub fn enricher(&self) -> &E {
        &self.enricher
    }

    fn transition(&mut self, next: PipelineState) {
        self.state = next;
        if let Some(observer) = &self.observer {
            observer(next);
        }
    }

    /// Decode uploaded bytes, then [`run`](Self::run).
    pub async fn run_bytes(&mut self, bytes: &[u8], header: HeaderMode) -> PipelineResult<RunReport> {
        let decoded = decode_bytes_auto(bytes)?;
        log_success(format!("Detected encoding: {}", decoded.encoding));
        let mut report = self.run(&decoded.text, header).await?;
        report.encoding = Some(decoded.encoding);
        Ok(report)
    }

    /// Run the full pipeline over CSV text.
    ///
    /// Any parse or validation violation ends the run in
    /// [`PipelineState::Invalid`] before enrichment; stored results from an
    /// earlier run are kept. The first enrichment failure ends the run in
    /// [`PipelineState::EnrichFailed`]; rows enriched so far are discarded
    /// and stored results are cleared.
    pub async fn run(&mut self, text: &str, header: HeaderMode) -> PipelineResult<RunReport> {
        self.transition(PipelineState::Parsing);
        log_info("📖 Parsing rows...");
        let parsed = parse_rows(text, header);
        log_success(format!(
            "Read {} row(s), {} malformed",
            parsed.rows.len(),
            parsed.violations.len()
        ));

        self.transition(PipelineState::Validating);
        log_info("✔️  Validating rows...");
        let violations = merge_violations(parsed.violations, &parsed.rows);

        if !violations.is_empty() {
            self.transition(PipelineState::Invalid);
            log_error(format!("{} violation(s), nothing was enriched", violations.len()));
            for v in violations.iter().take(5) {
                log_warning(v.message.clone());
            }
            return Err(PipelineError::Invalid { violations });
        }
        log_success(format!("All {} row(s) valid", parsed.rows.len()));

        let rows = self.enrich_rows(parsed.rows).await?;

        Ok(RunReport {
            rows,
            usage_count: self.usage_count,
            header: parsed.header,
            encoding: None,
            enricher: self.enricher.name(),
        })
    }

    async fn enrich_rows(&mut self, rows: Vec<CandidateRow>) -> PipelineResult<Vec<EnrichedRow>> {
        self.transition(PipelineState::Enriching);
        log_info(format!(
            "🌎 Enriching {} row(s) with {} hazard values...",
            rows.len(),
            self.enricher.name()
        ));

        let mut enriched = Vec::with_capacity(rows.len());

        for (i, row) in rows.into_iter().enumerate() {
            match self.enricher.enrich(&row).await {
                Ok(hazards) => {
                    self.usage_count += 1;
                    enriched.push(EnrichedRow::new(row, hazards));
                }
                Err(source) => {
                    let completed = enriched.len();
                    drop(enriched);
                    self.results.clear();
                    self.transition(PipelineState::EnrichFailed);
                    log_row(LogLevel::Error, i + 1, format!("Enrichment failed: {}", source));
                    return Err(PipelineError::Enrichment {
                        row: i + 1,
                        latitude: row.latitude,
                        longitude: row.longitude,
                        completed,
                        source,
                    });
                }
            }
        }

        self.results = enriched.clone();
        self.transition(PipelineState::Done);
        log_success(format!(
            "Enriched {} row(s) (usage count: {})",
            enriched.len(),
            self.usage_count
        ));
        Ok(enriched)
    }
}

/// Parse violations and validation violations as one list in line order.
fn merge_violations(parse: Vec<ValidationViolation>, rows: &[CandidateRow]) -> Vec<ValidationViolation> {
    let mut violations = parse;
    violations.extend(validate_all(rows));
    // Stable, so checks within one row keep their order
    violations.sort_by_key(|v| v.row_index);
    violations
}

/// Parse and validate without enriching.
///
/// Returns the validated rows, or every parse and validation violation
/// ordered by source line.
pub fn check_input(text: &str, header: HeaderMode) -> Result<Vec<CandidateRow>, Vec<ValidationViolation>> {
    let parsed = parse_rows(text, header);
    let violations = merge_violations(parsed.violations, &parsed.rows);

    if violations.is_empty() {
        Ok(parsed.rows)
    } else {
        Err(violations)
    }
}
