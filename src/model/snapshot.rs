use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use super::pool::Pool;
use super::protocol::Protocol;
use super::relationship::Relationship;

// ── Typed snapshot ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    /// Monotonic version string from the ingestion pipeline.
    pub version: String,
    /// Unix seconds at which the dataset was fetched upstream.
    pub fetched_at: i64,
    pub protocol_count: usize,
    pub pool_count: usize,
    /// Per-record ingestion problems absorbed during conversion (sanitized
    /// fields, dropped relationship edges). Degraded, not fatal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// The complete canonical dataset all compute components read from.
/// Immutable once built; replaced wholesale via [`SnapshotStore::swap`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub protocols: BTreeMap<String, Protocol>,
    pub relationships: Vec<Relationship>,
    pub pools: Vec<Pool>,
    pub metadata: SnapshotMetadata,
}

impl Snapshot {
    pub fn protocol(&self, slug: &str) -> Option<&Protocol> {
        self.protocols.get(slug)
    }

    pub fn pool(&self, id: &str) -> Option<&Pool> {
        self.pools.iter().find(|p| p.id == id)
    }

    pub fn pools_for_protocol(&self, slug: &str) -> Vec<&Pool> {
        self.pools.iter().filter(|p| p.protocol_slug == slug).collect()
    }
}

// ── Raw ingestion types ─────────────────────────────────────────────
//
// The feed is loosely typed: numbers may be missing or negative, enums may be
// arbitrary strings. Everything is validated/sanitized in `ingest` before any
// compute component sees it; downstream code never touches these types.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSnapshot {
    #[serde(default)]
    pub protocols: BTreeMap<String, RawProtocol>,
    #[serde(default)]
    pub relationships: Vec<RawRelationship>,
    #[serde(default, alias = "yields")]
    pub pools: Vec<RawPool>,
    #[serde(default)]
    pub metadata: RawMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMetadata {
    pub version: Option<String>,
    pub fetched_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProtocol {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub chains: Vec<String>,
    pub tvl: Option<f64>,
    pub maturity_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRelationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    pub weight: Option<f64>,
    pub evidence: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPool {
    pub pool: String,
    pub chain: Option<String>,
    #[serde(alias = "protocolSlug")]
    pub project: Option<String>,
    pub symbol: Option<String>,
    pub tvl_usd: Option<f64>,
    pub apy: Option<f64>,
    pub apy_base: Option<f64>,
    pub apy_reward: Option<f64>,
    #[serde(default)]
    pub stablecoin: bool,
    pub il_risk: Option<String>,
    #[serde(default)]
    pub underlying_tokens: Vec<String>,
    #[serde(default)]
    pub apy_history: Vec<RawApyPoint>,
}

#[derive(Debug, Deserialize)]
pub struct RawApyPoint {
    pub timestamp: i64,
    pub apy: Option<f64>,
}

// ── Snapshot store ──────────────────────────────────────────────────

/// Process-wide holder for the current snapshot. Readers clone an `Arc` to an
/// immutable dataset; ingestion swaps the whole reference, so a reader never
/// observes a torn dataset mid-refresh. `None` until first ingestion
/// (bootstrap is an expected state, handled as degraded-empty upstream).
#[derive(Default)]
pub struct SnapshotStore {
    current: RwLock<Option<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<Arc<Snapshot>> {
        self.current.read().expect("snapshot lock poisoned").clone()
    }

    pub fn swap(&self, snapshot: Snapshot) {
        *self.current.write().expect("snapshot lock poisoned") = Some(Arc::new(snapshot));
    }
}
