use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::analytics::{CrossProtocolHighlights, ProtocolAggregator, ProtocolSummary};
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{Envelope, Meta};
use crate::model::{Pool, Snapshot};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolsResponse {
    pub protocols: Vec<ProtocolSummary>,
    pub highlights: CrossProtocolHighlights,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolDetailResponse {
    pub summary: ProtocolSummary,
    pub pools: Vec<Pool>,
}

fn summaries(snapshot: &Snapshot) -> Vec<ProtocolSummary> {
    let mut out: Vec<ProtocolSummary> = snapshot
        .protocols
        .values()
        .filter_map(|protocol| {
            let pools = snapshot.pools_for_protocol(&protocol.slug);
            ProtocolAggregator::aggregate(protocol, &pools)
        })
        .collect();

    out.sort_by(|a, b| {
        b.trust_score
            .partial_cmp(&a.trust_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.slug.cmp(&b.slug))
    });
    out
}

pub async fn list_protocols(
    State(state): State<AppState>,
) -> Result<Json<Envelope<ProtocolsResponse>>, ApiError> {
    let Some(snapshot) = state.inner.snapshots.current() else {
        return Ok(Json(Envelope {
            data: ProtocolsResponse {
                protocols: Vec::new(),
                highlights: CrossProtocolHighlights::default(),
            },
            meta: Meta::unavailable(),
        }));
    };

    let protocols = summaries(&snapshot);
    let highlights = ProtocolAggregator::highlights(&protocols);

    Ok(Json(Envelope {
        data: ProtocolsResponse {
            protocols,
            highlights,
        },
        meta: Meta::from_snapshot(&snapshot),
    }))
}

pub async fn get_protocol(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Envelope<ProtocolDetailResponse>>, ApiError> {
    let Some(snapshot) = state.inner.snapshots.current() else {
        return Err(ApiError::NotFound(
            "snapshot not yet ingested; no protocols available".to_string(),
        ));
    };

    let protocol = snapshot
        .protocol(&slug)
        .ok_or_else(|| ApiError::NotFound(format!("no protocol with slug `{slug}`")))?;

    let pools = snapshot.pools_for_protocol(&slug);
    let summary = ProtocolAggregator::aggregate(protocol, &pools)
        .ok_or_else(|| ApiError::NotFound(format!("protocol `{slug}` has no pools")))?;

    Ok(Json(Envelope {
        data: ProtocolDetailResponse {
            summary,
            pools: pools.into_iter().cloned().collect(),
        },
        meta: Meta::from_snapshot(&snapshot),
    }))
}
