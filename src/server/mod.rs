pub mod error;

pub use error::ApiError;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::pipeline::Orchestrator;

/// Shared across all requests. The orchestrator is stateless per request,
/// so no locking is needed here.
pub struct AppState {
    pub pipeline: Orchestrator,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/summarize", post(summarize))
        .route("/health", get(health))
}

/// Bind and serve until the process is stopped.
pub async fn run_server(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let app = router()
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server listening on {}", addr);
    axum::serve(listener, app).await
}

// The browser client is served from its own origin
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

fn default_language() -> String {
    "en".to_string()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeRequest {
    pr_url: Option<String>,
    #[serde(default = "default_language")]
    target_language: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SummarizeResponse {
    summary: String,
    /// null when synthesis failed; the summary is still usable
    audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sentiment: Option<String>,
}

async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, ApiError> {
    let pr_url = request
        .pr_url
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("prUrl is required".to_string()))?;

    let outcome = state.pipeline.run(&pr_url, &request.target_language).await?;
    info!(
        language = %outcome.summary.language,
        audio = outcome.audio_url.is_some(),
        sentiment = ?outcome.sentiment,
        "summarize request served"
    );

    Ok(Json(SummarizeResponse {
        summary: outcome.summary.text,
        audio_url: outcome.audio_url,
        sentiment: outcome.sentiment.map(|label| label.to_string()),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
