//! HTTP server for the invoice pipeline.
//!
//! # API Endpoints
//!
//! | Method | Path                    | Description                          |
//! |--------|-------------------------|--------------------------------------|
//! | GET    | `/health`               | Health check                         |
//! | POST   | `/api/upload`           | Upload CSV, get preview and links    |
//! | GET    | `/downloads/{filename}` | Download a generated file            |
//! | GET    | `/api/logs`             | SSE stream for real-time logs        |

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path as UrlPath, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_success, log_warning, LOG_BROADCASTER};
use super::types::{error_response, UploadResponse};
use crate::error::{ErrorKind, PipelineError, ServerError, ServerResult};
use crate::pipeline::InvoicePipeline;

/// Names accepted by the download route: one path component, no leading dot.
static DOWNLOAD_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._ -]*$").expect("valid regex"));

const UPLOAD_FIELD: &str = "file";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<InvoicePipeline>,
}

impl AppState {
    pub fn new(pipeline: InvoicePipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    fn upload_dir(&self) -> &Path {
        &self.pipeline.config().upload_dir
    }

    fn output_dir(&self) -> &Path {
        &self.pipeline.config().output_dir
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .route("/downloads/{filename}", get(download_file))
        // CSV exports are not size-capped
        .layer(DefaultBodyLimit::disable())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(port: u16, pipeline: InvoicePipeline) -> Result<(), Box<dyn std::error::Error>> {
    let config = pipeline.config().clone();
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    tokio::fs::create_dir_all(&config.output_dir).await?;

    let app = router(AppState::new(pipeline));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Vibes invoice server running on http://localhost:{}", port);
    println!("   POST /api/upload            - Upload CSV file");
    println!("   GET  /downloads/{{filename}} - Download generated file");
    println!("   GET  /api/logs              - SSE log stream");
    println!("   GET  /health                - Health check");
    println!();
    println!("📁 Uploads: {}", config.upload_dir.display());
    println!("📁 Outputs: {}", config.output_dir.display());
    println!("🖨️  wkhtmltopdf: {}", config.wkhtmltopdf.display());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "vibes-invoice",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "download": "GET /downloads/{filename}",
            "logs": "GET /api/logs (SSE)"
        }
    }))
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

/// Upload CSV endpoint
async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            file_name = field.file_name().map(|s| s.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
                    .to_vec(),
            );
        }
    }

    let name = file_name
        .as_deref()
        .and_then(sanitize_upload_name)
        .ok_or_else(|| ServerError::BadRequest("No file selected".to_string()))?;
    let bytes = file_data
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ServerError::BadRequest("No file selected".to_string()))?;

    log_info(format!("📥 Upload: {} ({} bytes)", name, bytes.len()));

    let upload_dir = state.upload_dir().to_path_buf();
    let upload_path = upload_dir.join(&name);
    tokio::fs::create_dir_all(&upload_dir)
        .await
        .map_err(|e| PipelineError::io(&upload_dir, e))?;
    tokio::fs::write(&upload_path, &bytes)
        .await
        .map_err(|e| PipelineError::io(&upload_path, e))?;

    let pipeline = Arc::clone(&state.pipeline);
    let output = tokio::task::spawn_blocking(move || pipeline.run(&upload_path))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))??;

    log_success(format!(
        "Ready: {} and {}",
        output.spreadsheet_name(),
        output.document_name()
    ));

    Ok(Json(UploadResponse::from(output)))
}

/// Serve a generated file as an attachment
async fn download_file(
    State(state): State<AppState>,
    UrlPath(filename): UrlPath<String>,
) -> ServerResult<Response> {
    if !is_valid_download_name(&filename) {
        log_warning(format!("Rejected download name: {}", filename));
        return Err(ServerError::BadRequest(format!("Invalid file name: {}", filename)));
    }

    let path: PathBuf = state.output_dir().join(&filename);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ServerError::NotFound(filename));
        }
        Err(e) => return Err(PipelineError::io(&path, e).into()),
    };

    let headers = [
        (header::CONTENT_TYPE, content_type_for(&filename).to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];
    Ok((StatusCode::OK, headers, bytes).into_response())
}

/// Final path component of a client-supplied file name, if usable.
pub fn sanitize_upload_name(raw: &str) -> Option<String> {
    let last = raw.rsplit(['/', '\\']).next()?.trim();
    if last.is_empty() || last == "." || last == ".." {
        return None;
    }
    Some(last.to_string())
}

/// Whether `name` may be served from the output directory.
pub fn is_valid_download_name(name: &str) -> bool {
    DOWNLOAD_NAME.is_match(name) && !name.contains("..")
}

/// MIME type by file extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("pdf") => "application/pdf",
        Some("html") => "text/html; charset=utf-8",
        Some("csv") => "text/csv; charset=utf-8",
        _ => "application/octet-stream",
    }
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Pipeline(e) => match e.kind() {
                ErrorKind::Schema | ErrorKind::Data => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Io | ErrorKind::Render => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> Option<ErrorKind> {
        match self {
            ServerError::Pipeline(e) => Some(e.kind()),
            _ => None,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        eprintln!("❌ {}", self);
        let body = error_response(&self.to_string(), self.kind());
        (self.status_code(), Json(body)).into_response()
    }
}
