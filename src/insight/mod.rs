pub mod generator;
pub mod store;

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ApyPoint, Pool};

pub use generator::{HttpInsightGenerator, Insight, InsightComparison, InsightGenerator};
pub use store::{InsightStore, MemoryInsightStore, SqliteInsightStore};

/// Cache entry lifetime.
const TTL_HOURS: i64 = 24;

/// Maximum relative APY drift before a cached insight goes stale.
const MAX_APY_DRIFT: f64 = 0.20;

/// Maximum absolute risk-score drift before a cached insight goes stale.
const MAX_RISK_DRIFT: f64 = 5.0;

/// Most recent history points handed to the generator.
const MAX_HISTORY_POINTS: usize = 30;

/// Maximum similar pools handed to the generator.
pub const MAX_SIMILAR_POOLS: usize = 5;

#[derive(Debug, Error)]
pub enum InsightError {
    /// The narrative generator is down or misbehaving. Deliberately distinct
    /// from "no insight cached yet" so callers can tell the two apart.
    #[error("narrative generator unavailable: {0}")]
    GeneratorUnavailable(String),

    #[error("insight store error: {0:#}")]
    Store(#[source] anyhow::Error),
}

/// The pool numbers an insight was generated against, kept alongside the
/// narrative so staleness can be judged numerically.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSnapshotStats {
    pub apy: f64,
    pub risk_score: f64,
    pub tvl_usd: f64,
}

/// Whole persisted cache record, keyed by pool id. Replaced wholesale on
/// regeneration, never partially updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedInsight {
    pub pool_id: String,
    pub insight: Insight,
    pub pool_snapshot: PoolSnapshotStats,
    pub generated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResponse {
    pub insight: Insight,
    /// True when served from cache without regeneration.
    pub cached: bool,
    pub generated_at: DateTime<Utc>,
}

/// Caching layer over the narrative generator. One code path serves both the
/// normal read and force-regenerate: `force` simply deletes the existing
/// record first, so the staleness thresholds can never drift between paths.
pub struct InsightCache {
    store: Arc<dyn InsightStore>,
    generator: Arc<dyn InsightGenerator>,
}

impl InsightCache {
    pub fn new(store: Arc<dyn InsightStore>, generator: Arc<dyn InsightGenerator>) -> Self {
        Self { store, generator }
    }

    /// Serve the cached insight when still valid, otherwise regenerate
    /// synchronously and replace the record. Concurrent callers may race to
    /// regenerate the same pool; duplicate work is tolerated and the last
    /// whole-record write wins.
    pub async fn get_or_generate(
        &self,
        pool: &Pool,
        similar: &[Pool],
        force: bool,
    ) -> Result<InsightResponse, InsightError> {
        if force {
            self.store
                .delete(&pool.id)
                .await
                .map_err(InsightError::Store)?;
        } else if let Some(entry) = self
            .store
            .get(&pool.id)
            .await
            .map_err(InsightError::Store)?
        {
            if is_valid(&entry, pool, Utc::now()) {
                return Ok(InsightResponse {
                    insight: entry.insight,
                    cached: true,
                    generated_at: entry.generated_at,
                });
            }
        }

        let history = recent_history(pool);
        let insight = self
            .generator
            .generate(pool, &similar[..similar.len().min(MAX_SIMILAR_POOLS)], &history)
            .await
            .map_err(|e| InsightError::GeneratorUnavailable(format!("{e:#}")))?;

        let generated_at = Utc::now();
        let entry = CachedInsight {
            pool_id: pool.id.clone(),
            insight: insight.clone(),
            pool_snapshot: PoolSnapshotStats {
                apy: pool.apy,
                risk_score: pool.risk_score,
                tvl_usd: pool.tvl_usd,
            },
            generated_at,
            expires_at: generated_at + Duration::hours(TTL_HOURS),
        };
        self.store
            .upsert(&entry)
            .await
            .map_err(InsightError::Store)?;

        Ok(InsightResponse {
            insight,
            cached: false,
            generated_at,
        })
    }
}

/// A cached entry is valid iff it has not expired AND the pool's live numbers
/// have not drifted past the thresholds (≤20% relative APY, ≤5 risk points).
/// A zero cached APY invalidates on any nonzero change.
fn is_valid(entry: &CachedInsight, pool: &Pool, now: DateTime<Utc>) -> bool {
    if now >= entry.expires_at {
        return false;
    }

    let cached_apy = entry.pool_snapshot.apy;
    let apy_ok = if cached_apy == 0.0 {
        pool.apy == 0.0
    } else {
        ((pool.apy - cached_apy) / cached_apy).abs() <= MAX_APY_DRIFT
    };

    let risk_ok = (pool.risk_score - entry.pool_snapshot.risk_score).abs() <= MAX_RISK_DRIFT;

    apy_ok && risk_ok
}

fn recent_history(pool: &Pool) -> Vec<ApyPoint> {
    let start = pool.apy_history.len().saturating_sub(MAX_HISTORY_POINTS);
    pool.apy_history[start..].to_vec()
}

/// Pick up to [`MAX_SIMILAR_POOLS`] comparison pools: same chain, sharing an
/// underlying asset signature or symbol, largest TVL first.
pub fn similar_pools(pool: &Pool, all: &[Pool]) -> Vec<Pool> {
    let signature = pool.asset_signature();
    let mut candidates: Vec<&Pool> = all
        .iter()
        .filter(|p| p.id != pool.id)
        .filter(|p| p.chain.eq_ignore_ascii_case(&pool.chain))
        .filter(|p| {
            p.asset_signature() == signature || p.symbol.eq_ignore_ascii_case(&pool.symbol)
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.tvl_usd
            .partial_cmp(&a.tvl_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates
        .into_iter()
        .take(MAX_SIMILAR_POOLS)
        .cloned()
        .collect()
}
