//! HTTP API server for integration with other systems.
//!
//! Exposes the transcript, summary and chat views as JSON endpoints. The server
//! keeps no per-user state: every request carries the video URL, and chat
//! requests carry the conversation so far.

use crate::chat::ChatTurn;
use crate::cli::Output;
use crate::config::{Settings, SUPPORTED_LANGUAGES};
use crate::error::RecapError;
use crate::openai::ApiKey;
use crate::orchestrator::Orchestrator;
use crate::transcript::TranscriptExport;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

/// Shared application state.
struct AppState {
    orchestrator: Orchestrator,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    key: &ApiKey,
    settings: &Settings,
) -> anyhow::Result<()> {
    let orchestrator = Orchestrator::new(settings, key, None)?;
    let app = router(Arc::new(AppState { orchestrator }));

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Recap API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Languages", "GET  /languages");
    Output::kv("Transcript", "POST /transcript");
    Output::kv("Summary", "POST /summary");
    Output::kv("Chat", "POST /chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/languages", get(languages))
        .route("/transcript", post(transcript))
        .route("/summary", post(summary))
        .route("/chat", post(chat))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct VideoRequest {
    /// YouTube URL or video ID
    url: String,
    #[serde(default)]
    language: Option<String>,
}

#[derive(Serialize)]
struct LanguageInfo {
    code: &'static str,
    name: &'static str,
}

#[derive(Serialize)]
struct SummaryResponse {
    video_id: String,
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
    model: String,
    generated_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct ChatRequest {
    url: String,
    question: String,
    #[serde(default)]
    history: Vec<ChatTurn>,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
    history: Vec<ChatTurn>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

/// Library error rendered as a JSON error body.
struct ApiError(RecapError);

impl From<RecapError> for ApiError {
    fn from(err: RecapError) -> Self {
        Self(err)
    }
}

fn status_for(err: &RecapError) -> StatusCode {
    match err {
        RecapError::InvalidReference(_) | RecapError::EmptyInput(_) => StatusCode::BAD_REQUEST,
        RecapError::TranscriptUnavailable(_) => StatusCode::NOT_FOUND,
        RecapError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn languages() -> impl IntoResponse {
    let languages: Vec<LanguageInfo> = SUPPORTED_LANGUAGES
        .iter()
        .map(|&(code, name)| LanguageInfo { code, name })
        .collect();
    Json(languages)
}

async fn transcript(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VideoRequest>,
) -> Result<Json<TranscriptExport>, ApiError> {
    let mut session = state.orchestrator.open(&req.url)?;
    let transcript = state
        .orchestrator
        .transcript(&mut session, req.language.as_deref())
        .await?;
    Ok(Json(TranscriptExport::from(transcript)))
}

async fn summary(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VideoRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let mut session = state.orchestrator.open(&req.url)?;
    let video_id = session.video().id().to_string();
    let summary = state
        .orchestrator
        .summarize(&mut session, req.language.as_deref())
        .await?;
    Ok(Json(SummaryResponse {
        video_id,
        summary: summary.text.clone(),
        language: summary.language.clone(),
        model: summary.model.clone(),
        generated_at: summary.generated_at,
    }))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let mut session = state.orchestrator.open(&req.url)?.with_history(req.history);
    let reply = state
        .orchestrator
        .ask(&mut session, &req.question)
        .await?
        .content
        .clone();
    Ok(Json(ChatResponse {
        reply,
        history: session.into_history(),
    }))
}
