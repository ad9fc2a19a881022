use axum::Json;
use axum::extract::{Path, Query, State};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{Envelope, InsightParams, Meta};
use crate::insight::{self, InsightResponse};

/// Get-or-generate the narrative insight for one pool. `?force=true` deletes
/// the cached record first and regenerates synchronously.
pub async fn pool_insight(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(params): Query<InsightParams>,
) -> Result<Json<Envelope<InsightResponse>>, ApiError> {
    let Some(snapshot) = state.inner.snapshots.current() else {
        return Err(ApiError::NotFound(
            "snapshot not yet ingested; no pools available".to_string(),
        ));
    };

    let pool = snapshot
        .pool(&id)
        .ok_or_else(|| ApiError::NotFound(format!("no pool with id `{id}`")))?;

    let similar = insight::similar_pools(pool, &snapshot.pools);
    let response = state
        .inner
        .insights
        .get_or_generate(pool, &similar, params.force)
        .await?;

    Ok(Json(Envelope {
        data: response,
        meta: Meta::from_snapshot(&snapshot),
    }))
}
