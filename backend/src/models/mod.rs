//! Domain models for the hazard enrichment pipeline.
//!
//! - [`CandidateRow`] - One parsed input line, untyped strings
//! - [`Field`] - The five input columns
//! - [`ValidationViolation`] - A row-level diagnostic
//! - [`HazardKey`] - The eight hazard categories
//! - [`HazardValueSet`] - Per-hazard values plus response code
//! - [`EnrichedRow`] - A validated row joined with its hazard values

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel for a hazard value the service did not provide.
pub const NOT_AVAILABLE: &str = "N/A";

// =============================================================================
// Input Rows
// =============================================================================

/// The five positional input columns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Latitude,
    Longitude,
    StandardsVersion,
    RiskLevel,
    SiteClass,
}

impl Field {
    /// Column order of the input CSV.
    pub const ALL: [Field; 5] = [
        Field::Latitude,
        Field::Longitude,
        Field::StandardsVersion,
        Field::RiskLevel,
        Field::SiteClass,
    ];

    /// Human-readable column name, as printed in the template header.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::StandardsVersion => "Standards Version",
            Field::RiskLevel => "Risk Level",
            Field::SiteClass => "Site Class",
        }
    }
}

/// One CSV input line, fields trimmed but otherwise untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CandidateRow {
    pub latitude: String,
    pub longitude: String,
    pub standards_version: String,
    pub risk_level: String,
    pub site_class: String,
    /// 1-based physical line in the source text.
    #[serde(skip)]
    pub line: usize,
}

impl CandidateRow {
    /// Build a row from its five fields (already trimmed).
    pub fn new(
        latitude: impl Into<String>,
        longitude: impl Into<String>,
        standards_version: impl Into<String>,
        risk_level: impl Into<String>,
        site_class: impl Into<String>,
    ) -> Self {
        Self {
            latitude: latitude.into(),
            longitude: longitude.into(),
            standards_version: standards_version.into(),
            risk_level: risk_level.into(),
            site_class: site_class.into(),
            line: 0,
        }
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    /// Raw value of one input column.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Latitude => &self.latitude,
            Field::Longitude => &self.longitude,
            Field::StandardsVersion => &self.standards_version,
            Field::RiskLevel => &self.risk_level,
            Field::SiteClass => &self.site_class,
        }
    }
}

// =============================================================================
// Violations
// =============================================================================

/// A user-facing diagnostic attached to one row.
///
/// `row_index` is 0-based; `message` already embeds the 1-based row number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationViolation {
    pub row_index: usize,
    /// Offending column, `None` for whole-row problems.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<Field>,
    pub message: String,
}

impl ValidationViolation {
    pub fn new(row_index: usize, message: impl Into<String>) -> Self {
        Self {
            row_index,
            field: None,
            message: message.into(),
        }
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.field = Some(field);
        self
    }
}

impl fmt::Display for ValidationViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

// =============================================================================
// Hazards
// =============================================================================

/// Hazard categories looked up (or simulated) per site.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum HazardKey {
    Seismic,
    Wind,
    Snow,
    Ice,
    Rain,
    Flood,
    Tsunami,
    Tornado,
}

impl HazardKey {
    /// All keys, in output column order.
    pub const ALL: [HazardKey; 8] = [
        HazardKey::Seismic,
        HazardKey::Wind,
        HazardKey::Snow,
        HazardKey::Ice,
        HazardKey::Rain,
        HazardKey::Flood,
        HazardKey::Tsunami,
        HazardKey::Tornado,
    ];

    /// JSON key used by the hazard service.
    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKey::Seismic => "seismic",
            HazardKey::Wind => "wind",
            HazardKey::Snow => "snow",
            HazardKey::Ice => "ice",
            HazardKey::Rain => "rain",
            HazardKey::Flood => "flood",
            HazardKey::Tsunami => "tsunami",
            HazardKey::Tornado => "tornado",
        }
    }

    /// Upper bound of the simulated range (lower bound is 0).
    pub fn mock_max(&self) -> f64 {
        match self {
            HazardKey::Seismic => 10.0,
            HazardKey::Wind => 100.0,
            HazardKey::Snow => 50.0,
            HazardKey::Ice => 5.0,
            HazardKey::Rain => 200.0,
            HazardKey::Flood => 30.0,
            HazardKey::Tsunami => 3.0,
            HazardKey::Tornado => 2.0,
        }
    }
}

impl fmt::Display for HazardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hazard values for one site. Every key is always present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HazardValueSet {
    pub seismic: String,
    pub wind: String,
    pub snow: String,
    pub ice: String,
    pub rain: String,
    pub flood: String,
    pub tsunami: String,
    pub tornado: String,
    pub response_code: String,
}

impl HazardValueSet {
    /// Build a set by asking `value` for each hazard key in order.
    pub fn from_fn(mut value: impl FnMut(HazardKey) -> String, response_code: impl Into<String>) -> Self {
        Self {
            seismic: value(HazardKey::Seismic),
            wind: value(HazardKey::Wind),
            snow: value(HazardKey::Snow),
            ice: value(HazardKey::Ice),
            rain: value(HazardKey::Rain),
            flood: value(HazardKey::Flood),
            tsunami: value(HazardKey::Tsunami),
            tornado: value(HazardKey::Tornado),
            response_code: response_code.into(),
        }
    }

    pub fn get(&self, key: HazardKey) -> &str {
        match key {
            HazardKey::Seismic => &self.seismic,
            HazardKey::Wind => &self.wind,
            HazardKey::Snow => &self.snow,
            HazardKey::Ice => &self.ice,
            HazardKey::Rain => &self.rain,
            HazardKey::Flood => &self.flood,
            HazardKey::Tsunami => &self.tsunami,
            HazardKey::Tornado => &self.tornado,
        }
    }
}

// =============================================================================
// Enriched Rows
// =============================================================================

/// A validated input row joined with its hazard values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnrichedRow {
    #[serde(flatten)]
    pub site: CandidateRow,
    #[serde(flatten)]
    pub hazards: HazardValueSet,
}

impl EnrichedRow {
    pub fn new(site: CandidateRow, hazards: HazardValueSet) -> Self {
        Self { site, hazards }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enriched_row_serializes_flat() {
        let site = CandidateRow::new("34.0522", "-118.2437", "7-22", "2", "D");
        let hazards = HazardValueSet::from_fn(|k| format!("{}", k.mock_max()), "200");
        let value = serde_json::to_value(EnrichedRow::new(site, hazards)).unwrap();

        assert_eq!(value["latitude"], json!("34.0522"));
        assert_eq!(value["standardsVersion"], json!("7-22"));
        assert_eq!(value["siteClass"], json!("D"));
        assert_eq!(value["wind"], json!("100"));
        assert_eq!(value["responseCode"], json!("200"));
        assert!(value.get("line").is_none());
    }

    #[test]
    fn test_row_field_access() {
        let row = CandidateRow::new("1", "2", "7-10", "3", "F").with_line(4);
        assert_eq!(row.get(Field::StandardsVersion), "7-10");
        assert_eq!(row.get(Field::SiteClass), "F");
        assert_eq!(row.line, 4);
    }

    #[test]
    fn test_violation_skips_missing_field() {
        let v = ValidationViolation::new(2, "Row 3: incorrect number of columns");
        let value = serde_json::to_value(&v).unwrap();
        assert!(value.get("field").is_none());
        assert_eq!(value["rowIndex"], json!(2));

        let v = v.with_field(Field::RiskLevel);
        assert_eq!(serde_json::to_value(&v).unwrap()["field"], json!("riskLevel"));
    }
}
