use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::ingest;

/// Snapshot status: version, counts, and any ingestion warnings.
pub async fn status(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    match state.inner.snapshots.current() {
        Some(snapshot) => Ok(Json(json!({
            "ingested": true,
            "metadata": &snapshot.metadata,
        }))),
        None => Ok(Json(json!({
            "ingested": false,
            "metadata": null,
        }))),
    }
}

/// Re-load the snapshot from the configured source and swap it in wholesale.
/// Readers keep the previous snapshot until the swap; a failed load leaves it
/// untouched.
pub async fn refresh(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let snapshot = ingest::load(&state.inner.source)
        .await
        .map_err(|e| ApiError::Unavailable(format!("snapshot source unavailable: {e:#}")))?;

    let metadata = snapshot.metadata.clone();
    state.inner.snapshots.swap(snapshot);

    Ok(Json(json!({
        "refreshed": true,
        "metadata": metadata,
    })))
}
