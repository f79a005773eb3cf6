//! Row and batch validation against the rule catalog.
//!
//! Every check runs independently, so one row can collect several
//! violations. The only short-circuit is the missing-column gate: if any of
//! the five fields is empty the row gets a single violation and nothing
//! else is checked.
//!
//! This module also checks remote hazard responses against the embedded
//! JSON Schema (`schemas/hazard-response.json`, draft 7).
//!
//! # Example
//!
//! ```rust,ignore
//! use hazardtool::models::CandidateRow;
//! use hazardtool::validation::validate_row;
//!
//! let row = CandidateRow::new("34.0522", "-118.2437", "7-10", "5", "Z");
//! let violations = validate_row(&row, 0);
//! assert_eq!(violations.len(), 2); // risk level + site class
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::catalog::RULE_CATALOG;
use crate::models::{CandidateRow, Field, ValidationViolation};

static DECIMAL_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$"));

static HAZARD_RESPONSE_SCHEMA: Lazy<Result<Value, String>> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/hazard-response.json")).map_err(|e| e.to_string())
});

/// Parse a plain decimal number.
///
/// Rejects `NaN`, `inf`, hex and anything with trailing characters.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    let re = DECIMAL_RE.as_ref().ok()?;
    if !re.is_match(raw) {
        return None;
    }
    raw.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Validate one candidate row. `index` is the 0-based row number reported
/// in `row_index`; messages show `index + 1`.
///
/// Never fails; returns an empty vector for a valid row.
pub fn validate_row(row: &CandidateRow, index: usize) -> Vec<ValidationViolation> {
    let n = index + 1;
    let mut violations = Vec::new();

    if Field::ALL.iter().any(|f| row.get(*f).is_empty()) {
        violations.push(ValidationViolation::new(
            index,
            format!(
                "Row {}: Missing required columns. Ensure all 5 columns are filled (Latitude, Longitude, Standards, Risk, Site Class).",
                n
            ),
        ));
        return violations;
    }

    if let Some(v) = check_coordinate(&row.latitude, "Latitude", 90.0, index) {
        violations.push(v.with_field(Field::Latitude));
    }
    if let Some(v) = check_coordinate(&row.longitude, "Longitude", 180.0, index) {
        violations.push(v.with_field(Field::Longitude));
    }

    if !RULE_CATALOG.is_standards_version(&row.standards_version) {
        violations.push(
            ValidationViolation::new(
                index,
                format!(
                    "Row {}: Invalid standards version ({}). Allowed values: {}.",
                    n,
                    row.standards_version,
                    RULE_CATALOG.standards_versions().join(", ")
                ),
            )
            .with_field(Field::StandardsVersion),
        );
    }

    if !RULE_CATALOG.is_risk_level(&row.risk_level) {
        violations.push(
            ValidationViolation::new(
                index,
                format!(
                    "Row {}: Invalid risk level ({}). Allowed values: {}.",
                    n,
                    row.risk_level,
                    RULE_CATALOG.risk_levels().join(", ")
                ),
            )
            .with_field(Field::RiskLevel),
        );
    }

    let allowed = RULE_CATALOG.site_classes_for(&row.standards_version);
    let legal = allowed.is_some_and(|classes| classes.contains(&row.site_class.as_str()));
    if !legal {
        let listed = allowed
            .map(|classes| classes.join(", "))
            .unwrap_or_else(|| "None".to_string());
        violations.push(
            ValidationViolation::new(
                index,
                format!(
                    "Row {}: Invalid site class ({}) for standards version {}. Allowed values: {}.",
                    n, row.site_class, row.standards_version, listed
                ),
            )
            .with_field(Field::SiteClass),
        );
    }

    violations
}

fn check_coordinate(raw: &str, label: &str, bound: f64, index: usize) -> Option<ValidationViolation> {
    let n = index + 1;
    match parse_decimal(raw) {
        None => Some(ValidationViolation::new(
            index,
            format!("Row {}: {} ({}) is not a number.", n, label, raw),
        )),
        Some(v) if v < -bound || v > bound => Some(ValidationViolation::new(
            index,
            format!(
                "Row {}: Invalid {} ({}). Must be between -{} and {}.",
                n,
                label.to_lowercase(),
                raw,
                bound,
                bound
            ),
        )),
        Some(_) => None,
    }
}

/// Validate every row, concatenating violations in row order.
///
/// Rows that came out of the parser are numbered by their source line, so
/// messages line up with parse violations. Rows built by hand (`line == 0`)
/// are numbered by batch position.
pub fn validate_all(rows: &[CandidateRow]) -> Vec<ValidationViolation> {
    rows.iter()
        .enumerate()
        .flat_map(|(i, row)| validate_row(row, row.line.checked_sub(1).unwrap_or(i)))
        .collect()
}

/// Batch verdict: `Ok` iff no row has a violation.
pub fn validate_batch(rows: &[CandidateRow]) -> Result<(), Vec<ValidationViolation>> {
    let violations = validate_all(rows);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Validate a JSON value against a JSON schema.
pub fn validate_schema(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a hazard service body against the embedded response schema.
pub fn validate_hazard_response(data: &Value) -> Result<(), Vec<String>> {
    let schema = HAZARD_RESPONSE_SCHEMA
        .as_ref()
        .map_err(|e| vec![format!("Invalid embedded schema: {}", e)])?;
    validate_schema(schema, data)
}
