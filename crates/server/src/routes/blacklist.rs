use crate::error::{ServerError, ServerResult};
use crate::routes::run_blocking;
use crate::state::ServerState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// List blacklisted submitters, most recent first
pub async fn list_entries(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let entries = run_blocking(&state, |analyzer| Ok(analyzer.blacklist().list()?)).await?;

    Ok(Json(json!({
        "success": true,
        "count": entries.len(),
        "entries": entries,
    })))
}

/// Get one blacklist entry by submitter identifier
pub async fn get_entry(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let lookup = id.clone();
    let entry = run_blocking(&state, move |analyzer| Ok(analyzer.blacklist().get(&lookup)?))
        .await?
        .ok_or_else(|| ServerError::NotFound(format!("blacklist entry {id}")))?;

    Ok(Json(json!({
        "success": true,
        "entry": entry,
    })))
}

/// Remove a submitter from the blacklist
pub async fn delete_entry(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> ServerResult<impl IntoResponse> {
    let key = id.clone();
    let removed = run_blocking(&state, move |analyzer| Ok(analyzer.blacklist().remove(&key)?)).await?;
    if !removed {
        return Err(ServerError::NotFound(format!("blacklist entry {id}")));
    }

    tracing::info!(submitter = %id, "blacklist entry removed");
    Ok(Json(json!({
        "success": true,
        "removed": id,
    })))
}
