
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use fixtures_common::pool_with_risk;
use chrono::{Duration, Utc};
use yieldscope::insight::{
    CachedInsight, Insight, InsightCache, InsightComparison, InsightError, InsightGenerator,
    InsightStore, MemoryInsightStore, PoolSnapshotStats,
};
use yieldscope::model::{ApyPoint, Pool};

// ── Mock generator ──────────────────────────────────────────────────

struct MockGenerator {
    calls: AtomicUsize,
    fail: bool,
}

impl MockGenerator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InsightGenerator for MockGenerator {
    async fn generate(
        &self,
        pool: &Pool,
        _similar: &[Pool],
        _history: &[ApyPoint],
    ) -> Result<Insight> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(anyhow!("backend down"));
        }
        Ok(Insight {
            risk_explanation: format!("analysis of {}", pool.id),
            opportunities: vec!["steady base yield".into()],
            risks: vec!["smart contract risk".into()],
            apy_stability_analysis: "stable".into(),
            comparison: InsightComparison {
                vs_similar_pools: "competitive".into(),
                relative_position: "top quartile".into(),
            },
            verdict: "reasonable".into(),
        })
    }
}

fn cache_with(generator: Arc<MockGenerator>) -> (InsightCache, Arc<MemoryInsightStore>) {
    let store = Arc::new(MemoryInsightStore::new());
    (InsightCache::new(store.clone(), generator.clone()), store)
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn second_read_within_thresholds_is_cached() {
    let generator = Arc::new(MockGenerator::new());
    let (cache, _) = cache_with(generator.clone());

    let pool = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 40.0);
    let first = cache.get_or_generate(&pool, &[], false).await.unwrap();
    assert!(!first.cached);

    // Small drift: apy 10 → 10.5 (+5%), risk 40 → 41.
    let drifted = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.5, 41.0);
    let second = cache.get_or_generate(&drifted, &[], false).await.unwrap();
    assert!(second.cached);
    assert_eq!(generator.call_count(), 1);
    assert_eq!(second.generated_at, first.generated_at);
}

#[tokio::test]
async fn large_apy_drift_regenerates() {
    let generator = Arc::new(MockGenerator::new());
    let (cache, _) = cache_with(generator.clone());

    let pool = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 40.0);
    cache.get_or_generate(&pool, &[], false).await.unwrap();

    // apy 10 → 13 is +30%, past the 20% threshold.
    let drifted = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 13.0, 40.0);
    let resp = cache.get_or_generate(&drifted, &[], false).await.unwrap();
    assert!(!resp.cached);
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn large_risk_drift_regenerates() {
    let generator = Arc::new(MockGenerator::new());
    let (cache, _) = cache_with(generator.clone());

    let pool = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 40.0);
    cache.get_or_generate(&pool, &[], false).await.unwrap();

    let drifted = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 46.0);
    let resp = cache.get_or_generate(&drifted, &[], false).await.unwrap();
    assert!(!resp.cached);
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn expired_entry_regenerates_even_without_drift() {
    let generator = Arc::new(MockGenerator::new());
    let (cache, store) = cache_with(generator.clone());

    let pool = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 40.0);
    // Plant a record whose numbers exactly match the live pool but whose
    // lifetime has already lapsed.
    let stale = CachedInsight {
        pool_id: "p1".into(),
        insight: Insight {
            risk_explanation: "old analysis".into(),
            opportunities: vec![],
            risks: vec![],
            apy_stability_analysis: "stable".into(),
            comparison: InsightComparison {
                vs_similar_pools: "competitive".into(),
                relative_position: "median".into(),
            },
            verdict: "hold".into(),
        },
        pool_snapshot: PoolSnapshotStats {
            apy: 10.0,
            risk_score: 40.0,
            tvl_usd: 5_000_000.0,
        },
        generated_at: Utc::now() - Duration::hours(48),
        expires_at: Utc::now() - Duration::hours(24),
    };
    store.upsert(&stale).await.unwrap();

    let resp = cache.get_or_generate(&pool, &[], false).await.unwrap();
    assert!(!resp.cached);
    assert_eq!(generator.call_count(), 1);
    assert!(resp.generated_at > stale.generated_at);
}

#[tokio::test]
async fn zero_cached_apy_invalidates_on_any_change() {
    let generator = Arc::new(MockGenerator::new());
    let (cache, _) = cache_with(generator.clone());

    let pool = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 0.0, 40.0);
    cache.get_or_generate(&pool, &[], false).await.unwrap();

    let drifted = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 0.1, 40.0);
    let resp = cache.get_or_generate(&drifted, &[], false).await.unwrap();
    assert!(!resp.cached);
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn force_regenerates_even_when_valid() {
    let generator = Arc::new(MockGenerator::new());
    let (cache, _) = cache_with(generator.clone());

    let pool = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 40.0);
    cache.get_or_generate(&pool, &[], false).await.unwrap();
    let resp = cache.get_or_generate(&pool, &[], true).await.unwrap();
    assert!(!resp.cached);
    assert_eq!(generator.call_count(), 2);
}

#[tokio::test]
async fn generator_failure_surfaces_distinctly_and_writes_nothing() {
    let generator = Arc::new(MockGenerator::failing());
    let (cache, store) = cache_with(generator.clone());

    let pool = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 40.0);
    let err = cache.get_or_generate(&pool, &[], false).await.unwrap_err();
    assert!(matches!(err, InsightError::GeneratorUnavailable(_)));
    assert!(store.get("p1").await.unwrap().is_none());
}

#[tokio::test]
async fn records_are_separate_per_pool() {
    let generator = Arc::new(MockGenerator::new());
    let (cache, _) = cache_with(generator.clone());

    let a = pool_with_risk("a", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 40.0);
    let b = pool_with_risk("b", "aave", "ethereum", "DAI", 5_000_000.0, 10.0, 40.0);
    cache.get_or_generate(&a, &[], false).await.unwrap();
    cache.get_or_generate(&b, &[], false).await.unwrap();
    assert_eq!(generator.call_count(), 2);

    let again = cache.get_or_generate(&a, &[], false).await.unwrap();
    assert!(again.cached);
}

#[tokio::test]
async fn sqlite_store_round_trips_whole_records() {
    use yieldscope::insight::SqliteInsightStore;

    let dir = tempfile::tempdir().unwrap();
    let store = SqliteInsightStore::open(&dir.path().join("insights.db")).unwrap();
    let generator = Arc::new(MockGenerator::new());
    let cache = InsightCache::new(Arc::new(store), generator.clone());

    let pool = pool_with_risk("p1", "aave", "ethereum", "USDC", 5_000_000.0, 10.0, 40.0);
    let first = cache.get_or_generate(&pool, &[], false).await.unwrap();
    assert!(!first.cached);
    let second = cache.get_or_generate(&pool, &[], false).await.unwrap();
    assert!(second.cached);
    assert_eq!(generator.call_count(), 1);
}
