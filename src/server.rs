//! HTTP API over a [`Notebook`].
//!
//! # Endpoints
//!
//! | Method | Path | Body | Response |
//! |--------|------|------|----------|
//! | `POST` | `/upload_pdf` | multipart, field `file` | `{id, name, chunks}` |
//! | `GET`  | `/list_sources` | | `[{id, name, chunks}]` |
//! | `POST` | `/ask` | `{question, selected_ids}` | `{answer, chunks}` |
//! | `POST` | `/summarize` | `{selected_ids}` | `{result}` |
//! | `POST` | `/quiz` | `{selected_ids}` | `{result}` |
//! | `POST` | `/transcribe` | multipart, field `file` (audio) | `{text}` |
//! | `GET`  | `/health` | | `{status, version}` |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "Question required" } }
//! ```
//!
//! Error codes: `bad_request` (400), `payload_too_large` (413),
//! `unsupported_media_type` (415), `extraction_failed` (500),
//! `upstream_error` (502), `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser front end
//! served from another origin can call the API.

use axum::{
    extract::{
        multipart::MultipartError, rejection::JsonRejection, DefaultBodyLimit, Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::config::Config;
use crate::error::NotebookError;
use crate::extract::ExtractError;
use crate::notebook::Notebook;

/// Shared state handed to every handler.
#[derive(Clone)]
struct AppState {
    notebook: Arc<Notebook>,
}

/// Starts the HTTP server on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let notebook = Arc::new(Notebook::from_config(config)?);
    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;

    println!("Lectern listening on http://{}", config.server.bind);
    info!(bind = %config.server.bind, "server started");

    serve(listener, notebook, config.server.max_upload_bytes).await
}

/// Serve the API on an already bound listener.
pub async fn serve(
    listener: tokio::net::TcpListener,
    notebook: Arc<Notebook>,
    max_upload_bytes: usize,
) -> anyhow::Result<()> {
    axum::serve(listener, router(notebook, max_upload_bytes)).await?;
    Ok(())
}

/// Build the API router.
pub fn router(notebook: Arc<Notebook>, max_upload_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/upload_pdf", post(handle_upload_pdf))
        .route("/list_sources", get(handle_list_sources))
        .route("/ask", post(handle_ask))
        .route("/summarize", post(handle_summarize))
        .route("/quiz", post(handle_quiz))
        .route("/transcribe", post(handle_transcribe))
        .route("/health", get(handle_health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(cors)
        .with_state(AppState { notebook })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<NotebookError> for AppError {
    fn from(err: NotebookError) -> Self {
        let status = match &err {
            NotebookError::Input(_) | NotebookError::EmptyDocument(_) => StatusCode::BAD_REQUEST,
            NotebookError::Extraction(ExtractError::UnsupportedContentType(_)) => {
                StatusCode::UNSUPPORTED_MEDIA_TYPE
            }
            NotebookError::Extraction(_) => StatusCode::INTERNAL_SERVER_ERROR,
            NotebookError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            NotebookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(code = err.code(), error = %err, "request failed");
        }
        AppError {
            status,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        bad_request(rejection.body_text())
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Keeps the status axum assigns, so an over-limit body stays a 413.
fn multipart_error(err: MultipartError) -> AppError {
    let status = err.status();
    let code = match status {
        StatusCode::PAYLOAD_TOO_LARGE => "payload_too_large",
        s if s.is_server_error() => "internal",
        _ => "bad_request",
    };
    AppError {
        status,
        code: code.to_string(),
        message: err.body_text(),
    }
}

// ============ Uploads ============

struct UploadedFile {
    name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Pull the multipart field named `file` out of the request.
async fn read_file_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(bad_request("No selected file"));
        }
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(multipart_error)?;
        return Ok(UploadedFile {
            name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(bad_request("No file"))
}

#[derive(Serialize)]
struct SourceEntry {
    id: String,
    name: String,
    chunks: usize,
}

async fn handle_upload_pdf(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SourceEntry>, AppError> {
    let file = read_file_field(multipart).await?;
    let summary = state
        .notebook
        .ingest(&file.name, file.content_type.as_deref(), file.bytes)
        .await?;
    Ok(Json(SourceEntry {
        id: summary.id,
        name: summary.name,
        chunks: summary.passage_count,
    }))
}

async fn handle_list_sources(
    State(state): State<AppState>,
) -> Result<Json<Vec<SourceEntry>>, AppError> {
    let documents = state.notebook.list_documents().await?;
    Ok(Json(
        documents
            .into_iter()
            .map(|d| SourceEntry {
                id: d.id,
                name: d.name,
                chunks: d.passage_count,
            })
            .collect(),
    ))
}

// ============ Tasks ============

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: Option<String>,
    #[serde(default)]
    selected_ids: Vec<String>,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
    chunks: Vec<String>,
}

async fn handle_ask(
    State(state): State<AppState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, AppError> {
    let Json(req) = payload?;
    let question = req.question.unwrap_or_default();
    let answer = state.notebook.ask(&question, &req.selected_ids).await?;
    Ok(Json(AskResponse {
        answer: answer.answer,
        chunks: answer.supporting_passages,
    }))
}

#[derive(Deserialize)]
struct SelectionRequest {
    #[serde(default)]
    selected_ids: Vec<String>,
}

#[derive(Serialize)]
struct TaskResponse {
    result: String,
}

async fn handle_summarize(
    State(state): State<AppState>,
    payload: Result<Json<SelectionRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, AppError> {
    let Json(req) = payload?;
    let result = state.notebook.summarize(&req.selected_ids).await?;
    Ok(Json(TaskResponse { result }))
}

async fn handle_quiz(
    State(state): State<AppState>,
    payload: Result<Json<SelectionRequest>, JsonRejection>,
) -> Result<Json<TaskResponse>, AppError> {
    let Json(req) = payload?;
    let result = state.notebook.generate_quiz(&req.selected_ids).await?;
    Ok(Json(TaskResponse { result }))
}

#[derive(Serialize)]
struct TranscribeResponse {
    text: String,
}

async fn handle_transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranscribeResponse>, AppError> {
    let file = read_file_field(multipart).await?;
    let text = state.notebook.transcribe(&file.name, file.bytes).await?;
    Ok(Json(TranscribeResponse { text }))
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_and_code(err: NotebookError) -> (StatusCode, String) {
        let app: AppError = err.into();
        (app.status, app.code)
    }

    #[test]
    fn test_input_errors_are_bad_request() {
        assert_eq!(
            status_and_code(NotebookError::input("Question required")),
            (StatusCode::BAD_REQUEST, "bad_request".to_string())
        );
        assert_eq!(
            status_and_code(NotebookError::EmptyDocument("scan.pdf".into())).0,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_extraction_is_server_error() {
        assert_eq!(
            status_and_code(ExtractError::Pdf("bad xref".into()).into()),
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "extraction_failed".to_string()
            )
        );
    }

    #[test]
    fn test_unsupported_upload_is_415() {
        assert_eq!(
            status_and_code(ExtractError::UnsupportedContentType("text/plain".into()).into()),
            (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "unsupported_media_type".to_string()
            )
        );
    }

    #[test]
    fn test_upstream_is_bad_gateway() {
        let err = NotebookError::upstream("completion failed", anyhow::anyhow!("503"));
        assert_eq!(
            status_and_code(err),
            (StatusCode::BAD_GATEWAY, "upstream_error".to_string())
        );
    }

    #[test]
    fn test_internal_is_server_error() {
        let err = NotebookError::Internal(anyhow::anyhow!("broken"));
        assert_eq!(status_and_code(err).0, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_error_response_shape() {
        let response = bad_request("No documents selected").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
