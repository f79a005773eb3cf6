//! HTTP API tests against a server bound to an ephemeral port.

use std::time::Duration;

use axum::{extract::Query, response::Json, routing::get, Router};
use serde_json::{json, Value};
use std::collections::HashMap;

use hazardtool::api::{router, AppState};
use hazardtool::{Enricher, MockEnricher, RemoteConfig, RemoteEnricher};

const VALID_CSV: &str = "Latitude,Longitude,Standards Version,Risk Level,Site Class\n\
                         34.0522,-118.2437,7-22,2,D\n\
                         40.7128,-74.0060,7-16,3,B-estimated\n";

const BOUNDARY: &str = "hazardtool-test-boundary";

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn spawn_app(enricher: Enricher) -> String {
    spawn(router(AppState::new(enricher))).await
}

fn multipart_body(filename: &str, content: &str) -> Vec<u8> {
    format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {c}\r\n\
         --{b}--\r\n",
        b = BOUNDARY,
        f = filename,
        c = content
    )
    .into_bytes()
}

async fn upload(base: &str, path: &str, filename: &str, content: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .header(
            reqwest::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(multipart_body(filename, content))
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_health_and_catalog() {
    let base = spawn_app(MockEnricher::seeded(1).into()).await;

    let health: Value = reqwest::get(format!("{}/health", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let catalog: Value = reqwest::get(format!("{}/api/catalog", base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(catalog["riskLevels"], json!(["1", "2", "3", "4"]));
    assert_eq!(catalog["standards"][0]["version"], "7-10");
}

#[tokio::test]
async fn test_template_download() {
    let base = spawn_app(MockEnricher::seeded(1).into()).await;
    let resp = reqwest::get(format!("{}/api/template", base)).await.unwrap();

    assert_eq!(resp.status(), 200);
    let disposition = resp.headers()["content-disposition"].to_str().unwrap().to_string();
    assert!(disposition.contains("attachment"));

    let body = resp.text().await.unwrap();
    assert!(body.starts_with("Latitude,Longitude,Standards Version,Risk Level,Site Class\n"));
}

#[tokio::test]
async fn test_process_valid_upload() {
    let base = spawn_app(MockEnricher::seeded(1).into()).await;
    let resp = upload(&base, "/api/process", "sites.csv", VALID_CSV).await;

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);
    assert_eq!(body["metadata"]["rowCount"], 2);
    assert_eq!(body["metadata"]["usageCount"], 2);
    assert_eq!(body["metadata"]["enricher"], "mock");
}

#[tokio::test]
async fn test_process_invalid_upload() {
    let base = spawn_app(MockEnricher::seeded(1).into()).await;
    let resp = upload(&base, "/api/process", "sites.csv", "34.0522,-118.2437,7-10,5,Z\n").await;

    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "invalid");
    assert_eq!(body["violations"].as_array().unwrap().len(), 2);
    assert!(body["rows"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_process_rejects_non_csv_name() {
    let base = spawn_app(MockEnricher::seeded(1).into()).await;
    let resp = upload(&base, "/api/process", "sites.txt", VALID_CSV).await;

    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid file type. Please upload a .csv file.");
}

#[tokio::test]
async fn test_process_csv_output() {
    let base = spawn_app(MockEnricher::seeded(1).into()).await;
    let resp = upload(&base, "/api/process?format=csv", "sites.csv", VALID_CSV).await;

    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/csv"));

    let body = resp.text().await.unwrap();
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("Tornado,ResponseCode"));
}

async fn slow_hazards(Query(_): Query<HashMap<String, String>>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(400)).await;
    Json(json!({ "seismic": { "value": 1 }, "responseCode": 200 }))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_run_is_rejected() {
    let upstream = spawn(Router::new().route("/hazards", get(slow_hazards))).await;
    let remote = RemoteEnricher::new(
        RemoteConfig::new("test-key").with_endpoint(&format!("{}/hazards", upstream)),
    )
    .unwrap();
    let base = spawn_app(remote.into()).await;

    let first = {
        let base = base.clone();
        tokio::spawn(async move { upload(&base, "/api/process", "sites.csv", VALID_CSV).await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    let second = upload(&base, "/api/process", "sites.csv", VALID_CSV).await;
    assert_eq!(second.status(), 409);

    let first = first.await.unwrap();
    assert_eq!(first.status(), 200);
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["rows"][0]["wind"], "N/A");
}
