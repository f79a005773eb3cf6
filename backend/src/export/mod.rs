//! CSV output: enriched-row encoder, input template, download filenames.
//!
//! Output is comma-separated with `\n` line endings. Fields are quoted only
//! when they contain a delimiter, quote or newline, which never happens for
//! rows that passed validation.

use chrono::{DateTime, Utc};

use crate::error::{CsvError, CsvResult};
use crate::models::{EnrichedRow, Field, HazardKey};

/// One output column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Site(Field),
    Hazard(HazardKey),
    ResponseCode,
}

impl Column {
    /// Header name in the output CSV.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Site(Field::Latitude) => "Latitude",
            Column::Site(Field::Longitude) => "Longitude",
            Column::Site(Field::StandardsVersion) => "Standards",
            Column::Site(Field::RiskLevel) => "Risk",
            Column::Site(Field::SiteClass) => "SiteClass",
            Column::Hazard(HazardKey::Seismic) => "Seismic",
            Column::Hazard(HazardKey::Wind) => "Wind",
            Column::Hazard(HazardKey::Snow) => "Snow",
            Column::Hazard(HazardKey::Ice) => "Ice",
            Column::Hazard(HazardKey::Rain) => "Rain",
            Column::Hazard(HazardKey::Flood) => "Flood",
            Column::Hazard(HazardKey::Tsunami) => "Tsunami",
            Column::Hazard(HazardKey::Tornado) => "Tornado",
            Column::ResponseCode => "ResponseCode",
        }
    }

    fn value<'a>(&self, row: &'a EnrichedRow) -> &'a str {
        match self {
            Column::Site(field) => row.site.get(*field),
            Column::Hazard(key) => row.hazards.get(*key),
            Column::ResponseCode => &row.hazards.response_code,
        }
    }
}

/// Full output column order.
pub const OUTPUT_COLUMNS: [Column; 14] = [
    Column::Site(Field::Latitude),
    Column::Site(Field::Longitude),
    Column::Site(Field::StandardsVersion),
    Column::Site(Field::RiskLevel),
    Column::Site(Field::SiteClass),
    Column::Hazard(HazardKey::Seismic),
    Column::Hazard(HazardKey::Wind),
    Column::Hazard(HazardKey::Snow),
    Column::Hazard(HazardKey::Ice),
    Column::Hazard(HazardKey::Rain),
    Column::Hazard(HazardKey::Flood),
    Column::Hazard(HazardKey::Tsunami),
    Column::Hazard(HazardKey::Tornado),
    Column::ResponseCode,
];

/// Sample rows of the downloadable template, one per standards version.
const TEMPLATE_ROWS: [[&str; 5]; 4] = [
    ["34.0522", "-118.2437", "7-22", "2", "D"],
    ["40.7128", "-74.0060", "7-16", "3", "B-estimated"],
    ["37.7749", "-122.4194", "41-17", "1", "F"],
    ["29.7604", "-95.3698", "7-10", "4", "A"],
];

fn writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .delimiter(b',')
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> CsvResult<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::EncodeError(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::EncodeError(e.to_string()))
}

/// Encode rows with a header line, using `columns` as the field order.
pub fn encode_rows(rows: &[EnrichedRow], columns: &[Column]) -> CsvResult<String> {
    let mut wtr = writer();
    wtr.write_record(columns.iter().map(Column::header))?;
    for row in rows {
        wtr.write_record(columns.iter().map(|c| c.value(row)))?;
    }
    finish(wtr)
}

/// Encode rows with the full 14-column output layout.
pub fn encode_output(rows: &[EnrichedRow]) -> CsvResult<String> {
    encode_rows(rows, &OUTPUT_COLUMNS)
}

/// Input template: header plus four sample rows.
pub fn template_csv() -> CsvResult<String> {
    let mut wtr = writer();
    wtr.write_record(Field::ALL.iter().map(Field::label))?;
    for row in TEMPLATE_ROWS {
        wtr.write_record(row)?;
    }
    finish(wtr)
}

/// Download filename: `<prefix>-YYYYMMDDTHHMMSS.csv`.
pub fn output_filename(prefix: &str, at: DateTime<Utc>) -> String {
    format!("{}-{}.csv", prefix, at.format("%Y%m%dT%H%M%S"))
}
