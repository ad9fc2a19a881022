use axum::Json;
use axum::extract::{Path, Query, State};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{Envelope, Meta};
use crate::model::Pool;
use crate::query::{PoolQuery, PoolQueryParams};

pub async fn list_pools(
    State(state): State<AppState>,
    Query(params): Query<PoolQueryParams>,
) -> Result<Json<Envelope<Vec<Pool>>>, ApiError> {
    let query = PoolQuery::parse(params)?;

    let Some(snapshot) = state.inner.snapshots.current() else {
        return Ok(Json(Envelope {
            data: Vec::new(),
            meta: Meta::unavailable(),
        }));
    };

    Ok(Json(Envelope {
        data: query.apply(&snapshot.pools),
        meta: Meta::from_snapshot(&snapshot),
    }))
}

pub async fn get_pool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Envelope<Pool>>, ApiError> {
    let Some(snapshot) = state.inner.snapshots.current() else {
        return Err(ApiError::NotFound(
            "snapshot not yet ingested; no pools available".to_string(),
        ));
    };

    let pool = snapshot
        .pool(&id)
        .ok_or_else(|| ApiError::NotFound(format!("no pool with id `{id}`")))?;

    Ok(Json(Envelope {
        data: pool.clone(),
        meta: Meta::from_snapshot(&snapshot),
    }))
}
