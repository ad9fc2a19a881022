use axum::Json;
use axum::extract::{Query, State};

use crate::analytics::{SpreadDetector, YieldSpread};
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{Envelope, Meta};
use crate::query::SpreadQueryParams;

pub async fn list_spreads(
    State(state): State<AppState>,
    Query(params): Query<SpreadQueryParams>,
) -> Result<Json<Envelope<Vec<YieldSpread>>>, ApiError> {
    let Some(snapshot) = state.inner.snapshots.current() else {
        return Ok(Json(Envelope {
            data: Vec::new(),
            meta: Meta::unavailable(),
        }));
    };

    let spreads = SpreadDetector::find_spreads(
        &snapshot.pools,
        params.chain.as_deref(),
        params.min_spread_pct(),
    );

    Ok(Json(Envelope {
        data: spreads,
        meta: Meta::from_snapshot(&snapshot),
    }))
}
