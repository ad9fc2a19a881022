use axum::Json;
use axum::extract::{Query, State};

use crate::analytics::{RelationshipGraph, RelationshipGraphBuilder};
use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::api::types::{Envelope, Meta};
use crate::model::Protocol;
use crate::query::GraphQueryParams;

pub async fn get_graph(
    State(state): State<AppState>,
    Query(params): Query<GraphQueryParams>,
) -> Result<Json<Envelope<RelationshipGraph>>, ApiError> {
    let filters = params.parse()?;

    let Some(snapshot) = state.inner.snapshots.current() else {
        return Ok(Json(Envelope {
            data: RelationshipGraph {
                nodes: Vec::new(),
                links: Vec::new(),
            },
            meta: Meta::unavailable(),
        }));
    };

    let protocols: Vec<&Protocol> = snapshot.protocols.values().collect();
    let graph = RelationshipGraphBuilder::build(&protocols, &snapshot.relationships, &filters);

    Ok(Json(Envelope {
        data: graph,
        meta: Meta::from_snapshot(&snapshot),
    }))
}
