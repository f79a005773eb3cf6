//! End-to-end pipeline behavior with the mock enricher and a scripted one.

use std::fs;
use std::sync::atomic::{AtomicUsize, Ordering};

use hazardtool::{
    encode_output, CandidateRow, EnrichError, HazardEnricher, HazardKey, HazardValueSet, HeaderMode,
    MockEnricher, Pipeline, PipelineError, PipelineState,
};

/// Succeeds on every call except the `fail_at`-th (1-based).
struct ScriptedEnricher {
    fail_at: usize,
    calls: AtomicUsize,
}

impl ScriptedEnricher {
    fn failing_at(fail_at: usize) -> Self {
        Self {
            fail_at,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl HazardEnricher for ScriptedEnricher {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn enrich(&self, _row: &CandidateRow) -> Result<HazardValueSet, EnrichError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call == self.fail_at {
            Err(EnrichError::Status {
                status: 500,
                body: "boom".to_string(),
            })
        } else {
            Ok(HazardValueSet::from_fn(|_| "1.00".to_string(), "200"))
        }
    }
}

const FOUR_ROWS: &str = "34.0522,-118.2437,7-22,2,D\n\
                         40.7128,-74.0060,7-16,3,B-estimated\n\
                         37.7749,-122.4194,41-17,1,F\n\
                         29.7604,-95.3698,7-10,4,A\n";

#[tokio::test]
async fn test_single_valid_row() {
    let mut pipeline = Pipeline::new(MockEnricher::new());
    let report = pipeline
        .run("34.0522,-118.2437,7-22,2,D", HeaderMode::Absent)
        .await
        .unwrap();

    assert_eq!(report.rows.len(), 1);
    let row = &report.rows[0];
    assert_eq!(row.site.standards_version, "7-22");
    assert_eq!(row.site.risk_level, "2");
    assert_eq!(row.site.site_class, "D");
    for key in HazardKey::ALL {
        assert!(!row.hazards.get(key).is_empty());
    }
}

#[tokio::test]
async fn test_invalid_risk_and_site_class_halts() {
    let mut pipeline = Pipeline::new(MockEnricher::new());
    let err = pipeline
        .run("34.0522,-118.2437,7-10,5,Z", HeaderMode::Absent)
        .await
        .unwrap_err();

    let violations = err.violations();
    assert_eq!(violations.len(), 2);
    assert!(violations[0].message.contains("Invalid risk level (5)"));
    assert!(violations[1].message.contains("Invalid site class (Z)"));
    assert!(pipeline.results().is_empty());
    assert_eq!(pipeline.usage_count(), 0);
    assert_eq!(pipeline.state(), PipelineState::Invalid);
}

#[tokio::test]
async fn test_out_of_range_latitude_halts() {
    let mut pipeline = Pipeline::new(MockEnricher::new());
    let err = pipeline
        .run("200,-118.2437,7-22,2,D", HeaderMode::Absent)
        .await
        .unwrap_err();

    let violations = err.violations();
    assert!(violations.iter().any(|v| v.message.contains("Invalid latitude (200)")));
}

#[tokio::test]
async fn test_column_count_violations_share_the_channel() {
    let csv = "34.0522,-118.2437,7-22,2,D\n34.0522,-118.2437,7-22\n40.7128,-74.0060,7-16,9,B";
    let mut pipeline = Pipeline::new(MockEnricher::new());
    let err = pipeline.run(csv, HeaderMode::Absent).await.unwrap_err();

    let messages: Vec<&str> = err.violations().iter().map(|v| v.message.as_str()).collect();
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("Row 2: incorrect number of columns"));
    assert!(messages[1].contains("Invalid risk level (9)"));
}

#[tokio::test]
async fn test_mock_enrichment_preserves_order_and_ranges() {
    let mut pipeline = Pipeline::new(MockEnricher::seeded(99));
    let report = pipeline.run(FOUR_ROWS, HeaderMode::Auto).await.unwrap();

    let latitudes: Vec<&str> = report.rows.iter().map(|r| r.site.latitude.as_str()).collect();
    assert_eq!(latitudes, vec!["34.0522", "40.7128", "37.7749", "29.7604"]);

    for row in &report.rows {
        assert_eq!(row.hazards.response_code, "200");
        for key in HazardKey::ALL {
            let value: f64 = row.hazards.get(key).parse().unwrap();
            assert!((0.0..=key.mock_max()).contains(&value));
        }
    }
    assert_eq!(report.usage_count, 4);
}

#[tokio::test]
async fn test_fail_fast_on_first_enrichment_error() {
    let mut pipeline = Pipeline::new(ScriptedEnricher::failing_at(3));
    let err = pipeline.run(FOUR_ROWS, HeaderMode::Absent).await.unwrap_err();

    match &err {
        PipelineError::Enrichment {
            row,
            latitude,
            completed,
            source,
            ..
        } => {
            assert_eq!(*row, 3);
            assert_eq!(latitude, "37.7749");
            assert_eq!(*completed, 2);
            assert_eq!(source.status(), Some(500));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    assert_eq!(pipeline.enricher().calls(), 3);
    assert_eq!(pipeline.state(), PipelineState::EnrichFailed);
    assert!(pipeline.results().is_empty());
    assert_eq!(pipeline.usage_count(), 2);
}

#[tokio::test]
async fn test_failure_clears_previous_results() {
    let mut pipeline = Pipeline::new(ScriptedEnricher::failing_at(5));
    pipeline.run(FOUR_ROWS, HeaderMode::Absent).await.unwrap();
    assert_eq!(pipeline.results().len(), 4);

    // Fifth call overall is the first row of the second run
    assert!(pipeline.run(FOUR_ROWS, HeaderMode::Absent).await.is_err());
    assert!(pipeline.results().is_empty());
}

#[tokio::test]
async fn test_run_then_export() {
    let mut pipeline = Pipeline::new(MockEnricher::seeded(5));
    let report = pipeline.run(FOUR_ROWS, HeaderMode::Auto).await.unwrap();
    let csv = encode_output(&report.rows).unwrap();

    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("Latitude,Longitude,Standards,Risk,SiteClass,Seismic"));
    assert!(lines[2].starts_with("40.7128,-74.0060,7-16,3,B-estimated,"));
    assert!(lines[2].ends_with(",200"));
    assert_eq!(lines[1].split(',').count(), 14);
}

#[tokio::test]
async fn test_run_bytes_from_file_with_bom() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sites.csv");

    let mut bytes = b"\xEF\xBB\xBF".to_vec();
    bytes.extend_from_slice(b"Latitude,Longitude,Standards Version,Risk Level,Site Class\r\n");
    bytes.extend_from_slice(FOUR_ROWS.as_bytes());
    fs::write(&path, &bytes).unwrap();

    let mut pipeline = Pipeline::new(MockEnricher::seeded(3));
    let report = pipeline
        .run_bytes(&fs::read(&path).unwrap(), HeaderMode::Auto)
        .await
        .unwrap();

    assert_eq!(report.rows.len(), 4);
    assert_eq!(report.encoding.as_deref(), Some("utf-8"));
    assert_eq!(report.header.unwrap()[0], "Latitude");
}

#[tokio::test]
async fn test_auto_header_does_not_swallow_bad_first_row() {
    let mut pipeline = Pipeline::new(MockEnricher::new());
    let err = pipeline
        .run("abc,-118.2437,7-22,2,D\n34.0522,-118.2437,7-22,2,D", HeaderMode::Auto)
        .await
        .unwrap_err();

    let violations = err.violations();
    assert_eq!(violations.len(), 1);
    assert!(violations[0].message.starts_with("Row 1: Latitude (abc) is not a number."));
    assert_eq!(pipeline.usage_count(), 0);
}
