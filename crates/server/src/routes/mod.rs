//! API route handlers
//!
//! Routes are organized by functionality:
//!
//! - `health`: Liveness, readiness, and metrics
//! - `analysis`: Text cleaning, word extraction, similarity and comparison
//! - `blacklist`: Listing, lookup, and removal of blacklisted submitters

pub mod analysis;
pub mod blacklist;
pub mod health;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::FromRequest;
use axum::http::Uri;
use axum::response::IntoResponse;
use axum::Json;
use plagiat::{PipelineError, PlagiarismAnalyzer};
use serde_json::json;
use std::sync::Arc;

/// Every route the service answers, as listed by `GET /`.
pub const ROUTES: &[&str] = &[
    "GET    /health",
    "GET    /api/health",
    "GET    /ready",
    "GET    /metrics",
    "POST   /api/clean-text",
    "POST   /api/extract-words",
    "POST   /api/jaccard-similarity",
    "POST   /api/cosine-similarity",
    "POST   /api/common-words",
    "POST   /api/unique-words",
    "POST   /api/compare",
    "POST   /api/compare-with-highlight",
    "GET    /api/blacklist",
    "GET    /api/blacklist/{id}",
    "DELETE /api/blacklist/{id}",
];

/// Service name, version and available routes.
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Plagiat Server",
        "message": "Plagiarism similarity API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "routes": ROUTES,
    })))
}

/// JSON body extractor whose rejections use the service's error envelope.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ServerError))]
pub struct ApiJson<T>(pub T);

/// 404 Not Found handler
pub async fn not_found(uri: Uri) -> ServerError {
    ServerError::NotFound(uri.path().to_string())
}

/// Run an analyzer call that touches the blacklist store off the async
/// runtime.
pub(crate) async fn run_blocking<T, F>(state: &ServerState, f: F) -> ServerResult<T>
where
    F: FnOnce(&PlagiarismAnalyzer) -> Result<T, PipelineError> + Send + 'static,
    T: Send + 'static,
{
    let analyzer = Arc::clone(&state.analyzer);
    let result = tokio::task::spawn_blocking(move || f(&analyzer)).await?;
    Ok(result?)
}
