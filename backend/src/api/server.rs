//! HTTP server for the hazard tool.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                                |
//! |--------|-------------------|--------------------------------------------|
//! | GET    | `/health`         | Health check                               |
//! | GET    | `/api/catalog`    | Standards, risk levels and site classes    |
//! | GET    | `/api/template`   | Input template CSV                         |
//! | POST   | `/api/process`    | Upload CSV (`file` field), validate, enrich |
//! | GET    | `/api/logs`       | SSE stream for real-time logs              |
//!
//! One pipeline is shared by all requests. A `POST /api/process` arriving
//! while another run holds it gets `409 Conflict`.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio::sync::Mutex;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, LOG_BROADCASTER};
use super::types::{error_response, OutputFormat, ProcessQuery, ProcessResponse};
use crate::catalog::{RuleCatalog, RULE_CATALOG};
use crate::config::{MAX_UPLOAD_SIZE, OUTPUT_PREFIX, TEMPLATE_FILENAME};
use crate::enrich::{Enricher, HazardEnricher};
use crate::error::{PipelineError, ServerError};
use crate::export::{encode_output, output_filename, template_csv};
use crate::pipeline::Pipeline;

/// Shared server state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<Mutex<Pipeline<Enricher>>>,
}

impl AppState {
    pub fn new(enricher: Enricher) -> Self {
        Self {
            pipeline: Arc::new(Mutex::new(Pipeline::new(enricher))),
        }
    }
}

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, err: &ServerError) -> ApiError {
    (status, Json(error_response(&err.to_string())))
}

/// Build the router (exposed for tests).
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/catalog", get(catalog))
        .route("/api/template", get(template))
        .route("/api/process", post(process_csv))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16, enricher: Enricher) -> Result<(), Box<dyn std::error::Error>> {
    let mode = enricher.name();
    let app = router(AppState::new(enricher));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Hazard tool server running on http://localhost:{} ({} enrichment)", port, mode);
    println!("   POST /api/process  - Upload CSV file");
    println!("   GET  /api/template - Download input template");
    println!("   GET  /api/catalog  - Validation rules");
    println!("   GET  /api/logs     - SSE log stream");
    println!("   GET  /health       - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "hazardtool",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "process": "POST /api/process",
            "template": "GET /api/template",
            "catalog": "GET /api/catalog",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn catalog() -> Json<RuleCatalog> {
    Json(RULE_CATALOG.clone())
}

fn csv_attachment(body: String, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

async fn template() -> Result<Response, ApiError> {
    let body = template_csv().map_err(|e| {
        api_error(StatusCode::INTERNAL_SERVER_ERROR, &ServerError::Internal(e.to_string()))
    })?;
    Ok(csv_attachment(body, TEMPLATE_FILENAME))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload, validate and enrich a CSV
async fn process_csv(
    State(state): State<AppState>,
    Query(query): Query<ProcessQuery>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        api_error(StatusCode::BAD_REQUEST, &ServerError::BadRequest(format!("Multipart error: {}", e)))
    })? {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            let bytes = field.bytes().await.map_err(|e| {
                api_error(StatusCode::BAD_REQUEST, &ServerError::BadRequest(format!("Read error: {}", e)))
            })?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data.ok_or_else(|| {
        api_error(StatusCode::BAD_REQUEST, &ServerError::BadRequest("No file provided".to_string()))
    })?;

    if let Some(name) = &file_name {
        if !name.to_lowercase().ends_with(".csv") {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                &ServerError::BadRequest("Invalid file type. Please upload a .csv file.".to_string()),
            ));
        }
    }

    let mut pipeline = state
        .pipeline
        .try_lock()
        .map_err(|_| api_error(StatusCode::CONFLICT, &ServerError::Busy))?;

    log_info(format!(
        "📄 New upload: {} ({} bytes)",
        file_name.as_deref().unwrap_or("unknown"),
        bytes.len()
    ));

    match pipeline.run_bytes(&bytes, query.header).await {
        Ok(report) => match query.format {
            OutputFormat::Csv => {
                let body = encode_output(&report.rows).map_err(|e| {
                    api_error(StatusCode::INTERNAL_SERVER_ERROR, &ServerError::Internal(e.to_string()))
                })?;
                let filename = output_filename(OUTPUT_PREFIX, chrono::Utc::now());
                Ok(csv_attachment(body, &filename))
            }
            OutputFormat::Json => Ok(Json(ProcessResponse::ready(report)).into_response()),
        },
        Err(err) => {
            let status = match &err {
                PipelineError::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::Enrichment { .. } => StatusCode::BAD_GATEWAY,
                PipelineError::Csv(_) => StatusCode::BAD_REQUEST,
            };
            let body = ProcessResponse::from_error(&err, pipeline.usage_count(), pipeline.enricher().name());
            Ok((status, Json(body)).into_response())
        }
    }
}
