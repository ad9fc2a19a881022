use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::Pool;

/// Percentage points of APY discounted per point of extra risk carried by the
/// higher-yield pool.
const RISK_PENALTY_PER_POINT: f64 = 0.1;

/// Liquidity floor for full confidence, in USD.
const LIQUIDITY_FLOOR: f64 = 1_000_000.0;

/// Share of the spread that must come from base APY for the spread to count
/// as base-driven (sustainable) rather than emission-driven.
const BASE_DRIVEN_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// The slice of a pool a spread references.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadPool {
    pub id: String,
    pub protocol_slug: String,
    pub symbol: String,
    pub chain: String,
    pub apy: f64,
    pub apy_base: f64,
    pub tvl_usd: f64,
    pub risk_score: f64,
}

impl From<&Pool> for SpreadPool {
    fn from(p: &Pool) -> Self {
        SpreadPool {
            id: p.id.clone(),
            protocol_slug: p.protocol_slug.clone(),
            symbol: p.symbol.clone(),
            chain: p.chain.clone(),
            apy: p.apy,
            apy_base: p.apy_base,
            tvl_usd: p.tvl_usd,
            risk_score: p.risk_score,
        }
    }
}

/// A detected cross-protocol yield spread for an equivalent asset.
/// Derived per request, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldSpread {
    pub asset: String,
    /// "stablecoin" when both legs hold stablecoins, else "volatile".
    pub asset_type: &'static str,
    pub high_pool: SpreadPool,
    pub low_pool: SpreadPool,
    /// Strictly positive raw APY difference, percentage points.
    pub apy_spread: f64,
    /// Risk-adjusted spread; always ≤ `apy_spread`.
    pub net_spread: f64,
    /// Smaller of the two pools' TVLs — the executable size bound.
    pub min_liquidity: f64,
    pub confidence: Confidence,
    /// True when base APY (not reward emissions) explains most of the spread.
    pub is_base_apy_driven: bool,
}

pub struct SpreadDetector;

impl SpreadDetector {
    /// Find cross-protocol spreads among economically equivalent pools.
    /// Deterministic for a fixed snapshot: groups iterate in sorted key order
    /// and all ties break on pool id.
    pub fn find_spreads(
        pools: &[Pool],
        chain_filter: Option<&str>,
        min_spread_pct: f64,
    ) -> Vec<YieldSpread> {
        // Group by (chain, canonical asset signature). BTreeMap keeps group
        // iteration order stable across calls. Chain is lowercased so pools
        // differing only in chain casing still pair up.
        let mut groups: BTreeMap<(String, String), Vec<&Pool>> = BTreeMap::new();
        for pool in pools {
            if let Some(chain) = chain_filter {
                if !pool.chain.eq_ignore_ascii_case(chain) {
                    continue;
                }
            }
            groups
                .entry((pool.chain.to_lowercase(), pool.asset_signature()))
                .or_default()
                .push(pool);
        }

        let mut spreads = Vec::new();
        for ((_, signature), group) in &groups {
            if let Some(spread) = Self::spread_for_group(signature, group, min_spread_pct) {
                spreads.push(spread);
            }
        }

        spreads.sort_by(|a, b| {
            b.net_spread
                .partial_cmp(&a.net_spread)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.high_pool.id.cmp(&b.high_pool.id))
        });
        spreads
    }

    fn spread_for_group(
        asset: &str,
        group: &[&Pool],
        min_spread_pct: f64,
    ) -> Option<YieldSpread> {
        // A spread needs at least two distinct protocols in the group.
        let mut protocols: Vec<&str> =
            group.iter().map(|p| p.protocol_slug.as_str()).collect();
        protocols.sort();
        protocols.dedup();
        if protocols.len() < 2 {
            return None;
        }

        let high = group
            .iter()
            .max_by(|a, b| cmp_apy_then_id(a, b))?;
        let low = group
            .iter()
            .min_by(|a, b| cmp_apy_then_id(a, b))?;

        let apy_spread = high.apy - low.apy;
        if apy_spread <= 0.0 || apy_spread < min_spread_pct {
            return None;
        }

        // Discount spread earned purely by taking more risk. No penalty when
        // the higher-yield pool is not the riskier one.
        let risk_penalty = (high.risk_score - low.risk_score).max(0.0) * RISK_PENALTY_PER_POINT;
        let net_spread = apy_spread - risk_penalty;

        let both_liquid = high.tvl_usd >= LIQUIDITY_FLOOR && low.tvl_usd >= LIQUIDITY_FLOOR;
        let both_stable_history = high.apy_stability.is_some() && low.apy_stability.is_some();
        let confidence = match (both_liquid, both_stable_history) {
            (true, true) => Confidence::High,
            (true, false) | (false, true) => Confidence::Medium,
            (false, false) => Confidence::Low,
        };

        let base_spread = high.apy_base - low.apy_base;
        let is_base_apy_driven = base_spread / apy_spread > BASE_DRIVEN_THRESHOLD;

        Some(YieldSpread {
            asset: asset.to_string(),
            asset_type: if high.stablecoin && low.stablecoin {
                "stablecoin"
            } else {
                "volatile"
            },
            high_pool: SpreadPool::from(*high),
            low_pool: SpreadPool::from(*low),
            apy_spread,
            net_spread,
            min_liquidity: high.tvl_usd.min(low.tvl_usd),
            confidence,
            is_base_apy_driven,
        })
    }
}

fn cmp_apy_then_id(a: &Pool, b: &Pool) -> std::cmp::Ordering {
    a.apy
        .partial_cmp(&b.apy)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| b.id.cmp(&a.id))
}
