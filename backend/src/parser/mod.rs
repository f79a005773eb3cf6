//! Site CSV parser with encoding auto-detection.
//!
//! Splits raw text into [`CandidateRow`]s of exactly five comma-separated
//! fields. Rows with any other field count are reported as violations and
//! left out of the output; blank lines are skipped silently.
//!
//! # Example
//! ```ignore
//! use hazardtool::parser::{parse_rows, HeaderMode};
//!
//! let outcome = parse_rows("Latitude,Longitude,Standards,Risk,Site\n34.05,-118.24,7-22,2,D", HeaderMode::Auto);
//! assert_eq!(outcome.rows.len(), 1);
//! assert!(outcome.violations.is_empty());
//! ```

use serde::{Deserialize, Serialize};

use crate::catalog::RULE_CATALOG;
use crate::error::{CsvError, CsvResult};
use crate::models::{CandidateRow, ValidationViolation};
use crate::validation::parse_decimal;

/// Number of columns every data row must have.
pub const EXPECTED_COLUMNS: usize = 5;

/// Field separator. Quoting is not supported on input.
pub const DELIMITER: char = ',';

/// How the first non-blank line is treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// First non-blank line is a header and is skipped.
    Present,
    /// Every line is data.
    Absent,
    /// Header iff the first non-blank line has five non-empty labels and
    /// none of them is a number or a catalog value.
    #[default]
    Auto,
}

impl std::str::FromStr for HeaderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "present" | "yes" | "true" => Ok(HeaderMode::Present),
            "absent" | "no" | "false" => Ok(HeaderMode::Absent),
            "auto" => Ok(HeaderMode::Auto),
            other => Err(format!("unknown header mode '{}' (expected auto, present or absent)", other)),
        }
    }
}

/// Result of parsing: accepted rows plus column-count violations.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    /// Rows with exactly five fields, in input order
    pub rows: Vec<CandidateRow>,
    /// One violation per line with the wrong number of fields
    pub violations: Vec<ValidationViolation>,
    /// Header fields, if a header line was skipped
    pub header: Option<Vec<String>>,
}

/// Decoded input with the detected encoding.
#[derive(Debug, Clone)]
pub struct DecodedInput {
    pub text: String,
    pub encoding: String,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "utf-8-sig" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> CsvResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.into_owned(),
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    if text.contains('\0') {
        return Err(CsvError::EncodingError(format!(
            "input looks binary (decoded as {})",
            encoding
        )));
    }

    Ok(text.trim_start_matches('\u{feff}').to_string())
}

/// Decode uploaded bytes with encoding auto-detection.
pub fn decode_bytes_auto(bytes: &[u8]) -> CsvResult<DecodedInput> {
    let encoding = detect_encoding(bytes);
    let text = decode_content(bytes, &encoding)?;
    Ok(DecodedInput { text, encoding })
}

/// Split `text` into candidate rows.
///
/// Never fails: malformed lines become violations, empty input yields an
/// empty outcome. Pure function of its input.
pub fn parse_rows(text: &str, header: HeaderMode) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();
    let mut seen_first = false;

    for (line_idx, line) in text.lines().enumerate() {
        let line_num = line_idx + 1;

        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<String> = line
            .split(DELIMITER)
            .map(|s| s.trim().to_string())
            .collect();

        if !seen_first {
            seen_first = true;
            if is_header(&fields, header) {
                outcome.header = Some(fields);
                continue;
            }
        }

        if fields.len() != EXPECTED_COLUMNS {
            outcome.violations.push(ValidationViolation::new(
                line_idx,
                format!(
                    "Row {}: incorrect number of columns (expected {}, found {})",
                    line_num,
                    EXPECTED_COLUMNS,
                    fields.len()
                ),
            ));
            continue;
        }

        let [latitude, longitude, standards, risk, site_class]: [String; EXPECTED_COLUMNS] =
            match fields.try_into() {
                Ok(fields) => fields,
                Err(_) => continue,
            };
        outcome.rows.push(
            CandidateRow::new(latitude, longitude, standards, risk, site_class).with_line(line_num),
        );
    }

    outcome
}

fn is_header(fields: &[String], mode: HeaderMode) -> bool {
    match mode {
        HeaderMode::Present => true,
        HeaderMode::Absent => false,
        HeaderMode::Auto => looks_like_header(fields),
    }
}

/// Five non-empty labels, none of them a number or a catalog value.
///
/// Anything else is data, so a broken first row still gets reported.
fn looks_like_header(fields: &[String]) -> bool {
    fields.len() == EXPECTED_COLUMNS
        && fields.iter().all(|f| {
            !f.is_empty()
                && parse_decimal(f).is_none()
                && !RULE_CATALOG.is_standards_version(f)
                && !RULE_CATALOG.is_risk_level(f)
                && !RULE_CATALOG.is_site_class(f)
        })
}
