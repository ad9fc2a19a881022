use serde::{Deserialize, Serialize};

use crate::model::Snapshot;

// ── Response envelope ───────────────────────────────────────────────

/// Every endpoint returns a well-formed `{ data, meta }` body. A missing
/// snapshot (bootstrap) degrades to empty data with an explanatory meta
/// block, never a hard failure.
#[derive(Serialize)]
pub struct Envelope<T: Serialize> {
    pub data: T,
    pub meta: Meta,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<i64>,
    pub degraded: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
}

impl Meta {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Meta {
            snapshot_version: Some(snapshot.metadata.version.clone()),
            fetched_at: Some(snapshot.metadata.fetched_at),
            degraded: !snapshot.metadata.warnings.is_empty(),
            notes: snapshot.metadata.warnings.clone(),
        }
    }

    pub fn unavailable() -> Self {
        Meta {
            snapshot_version: None,
            fetched_at: None,
            degraded: true,
            notes: vec!["snapshot not yet ingested".to_string()],
        }
    }
}

// ── Request types ───────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct InsightParams {
    /// Delete any cached record and regenerate synchronously.
    pub force: bool,
}
