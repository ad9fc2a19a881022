use serde::Serialize;

use crate::model::{Pool, Protocol};

// Trust score weights: safety (inverse avg risk), pool-count diversity, TVL tier.
const W_SAFETY: f64 = 0.5;
const W_DIVERSITY: f64 = 0.2;
const W_TVL_TIER: f64 = 0.3;

/// Protocol-level rollup of its scored pools. Recomputed per request, never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtocolSummary {
    pub slug: String,
    pub name: String,
    pub category: String,
    pub pool_count: usize,
    pub total_tvl: f64,
    /// TVL-weighted average APY across the protocol's pools.
    pub avg_apy: f64,
    pub avg_risk_score: f64,
    pub min_risk_score: f64,
    pub max_apy: f64,
    /// Pool id of the protocol's largest pool by TVL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_pool: Option<String>,
    pub trust_score: f64,
    /// Same buckets as risk level, inverted sense: high trust is good.
    pub trust_level: &'static str,
}

/// Winners across a set of protocol summaries, each identified by slug.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossProtocolHighlights {
    pub highest_tvl: Option<String>,
    pub highest_apy: Option<String>,
    pub lowest_risk: Option<String>,
    /// Best `avg_apy / max(avg_risk_score, 1)` — risk-adjusted yield.
    pub best_risk_adjusted: Option<String>,
    pub most_pools: Option<String>,
}

pub struct ProtocolAggregator;

impl ProtocolAggregator {
    /// Roll up a protocol's scored pools into a summary. Returns `None` for a
    /// protocol with no pools in the snapshot — there is nothing to score.
    pub fn aggregate(protocol: &Protocol, pools: &[&Pool]) -> Option<ProtocolSummary> {
        if pools.is_empty() {
            return None;
        }

        let pool_count = pools.len();
        let total_tvl: f64 = pools.iter().map(|p| p.tvl_usd).sum();

        let avg_apy = if total_tvl > 0.0 {
            pools.iter().map(|p| p.apy * p.tvl_usd).sum::<f64>() / total_tvl
        } else {
            pools.iter().map(|p| p.apy).sum::<f64>() / pool_count as f64
        };

        let avg_risk_score =
            pools.iter().map(|p| p.risk_score).sum::<f64>() / pool_count as f64;
        let min_risk_score = pools
            .iter()
            .map(|p| p.risk_score)
            .fold(f64::INFINITY, f64::min);
        let max_apy = pools.iter().map(|p| p.apy).fold(0.0_f64, f64::max);

        let top_pool = pools
            .iter()
            .max_by(|a, b| {
                a.tvl_usd
                    .partial_cmp(&b.tvl_usd)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|p| p.id.clone());

        let trust_score = trust_score(avg_risk_score, pool_count, total_tvl);

        Some(ProtocolSummary {
            slug: protocol.slug.clone(),
            name: protocol.name.clone(),
            category: protocol.category.clone(),
            pool_count,
            total_tvl,
            avg_apy,
            avg_risk_score,
            min_risk_score,
            max_apy,
            top_pool,
            trust_score,
            trust_level: trust_level(trust_score),
        })
    }

    /// Cross-protocol winners. Empty input yields an all-`None` highlight block.
    pub fn highlights(summaries: &[ProtocolSummary]) -> CrossProtocolHighlights {
        let by = |f: fn(&ProtocolSummary) -> f64| {
            summaries
                .iter()
                .max_by(|a, b| f(a).partial_cmp(&f(b)).unwrap_or(std::cmp::Ordering::Equal))
                .map(|s| s.slug.clone())
        };

        CrossProtocolHighlights {
            highest_tvl: by(|s| s.total_tvl),
            highest_apy: by(|s| s.max_apy),
            // Max of negated risk = min risk.
            lowest_risk: by(|s| -s.avg_risk_score),
            best_risk_adjusted: by(|s| s.avg_apy / s.avg_risk_score.max(1.0)),
            most_pools: by(|s| s.pool_count as f64),
        }
    }
}

fn trust_score(avg_risk: f64, pool_count: usize, total_tvl: f64) -> f64 {
    let safety = (100.0 - avg_risk).clamp(0.0, 100.0);
    let diversity = (pool_count.min(10) * 10) as f64;
    let tvl_tier = (((total_tvl + 1.0).log10() - 4.0) * 20.0).clamp(0.0, 100.0);
    (W_SAFETY * safety + W_DIVERSITY * diversity + W_TVL_TIER * tvl_tier).clamp(0.0, 100.0)
}

fn trust_level(score: f64) -> &'static str {
    if score >= 75.0 {
        "very_high"
    } else if score >= 50.0 {
        "high"
    } else if score >= 25.0 {
        "medium"
    } else {
        "low"
    }
}
