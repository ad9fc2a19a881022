use serde::Deserialize;
use thiserror::Error;

use crate::model::{Pool, RelationshipType, RiskLevel, Trend};

const DEFAULT_POOL_LIMIT: usize = 100;
const DEFAULT_MIN_SPREAD_PCT: f64 = 0.5;

#[derive(Debug, Error)]
#[error("invalid query parameter `{param}`: {message}")]
pub struct QueryError {
    pub param: &'static str,
    pub message: String,
}

// ── Pool queries ────────────────────────────────────────────────────

/// Pool sort orders. Risk sorts ascending (safest first); the rest descending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Tvl,
    Apy,
    Risk,
    Stability,
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tvl" => Ok(SortBy::Tvl),
            "apy" => Ok(SortBy::Apy),
            "risk" => Ok(SortBy::Risk),
            "stability" => Ok(SortBy::Stability),
            other => Err(format!("unknown sort `{other}` (expected tvl|apy|risk|stability)")),
        }
    }
}

/// Raw pool query parameters, exactly as they arrive on the wire.
/// Enum-valued fields stay strings here; [`PoolQuery::parse`] validates them.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoolQueryParams {
    pub chain: Option<String>,
    pub protocol: Option<String>,
    pub yields_only: Option<bool>,
    pub min_apy: Option<f64>,
    pub max_apy: Option<f64>,
    pub stablecoin_only: Option<bool>,
    /// Alias of `stablecoinOnly` kept for compatibility with older clients.
    pub stable_only: Option<bool>,
    pub risk_level: Option<String>,
    pub max_risk_score: Option<f64>,
    pub min_stability: Option<f64>,
    pub trend: Option<String>,
    pub sort_by: Option<String>,
    pub limit: Option<usize>,
    /// Alias of `limit`.
    pub yield_limit: Option<usize>,
}

/// Validated pool query.
#[derive(Debug)]
pub struct PoolQuery {
    pub chain: Option<String>,
    pub protocol: Option<String>,
    pub yields_only: bool,
    pub min_apy: Option<f64>,
    pub max_apy: Option<f64>,
    pub stablecoin_only: bool,
    pub risk_level: Option<RiskLevel>,
    pub max_risk_score: Option<f64>,
    pub min_stability: Option<f64>,
    pub trend: Option<Trend>,
    pub sort_by: SortBy,
    pub limit: usize,
}

impl Default for PoolQuery {
    fn default() -> Self {
        PoolQuery {
            chain: None,
            protocol: None,
            yields_only: false,
            min_apy: None,
            max_apy: None,
            stablecoin_only: false,
            risk_level: None,
            max_risk_score: None,
            min_stability: None,
            trend: None,
            sort_by: SortBy::default(),
            limit: DEFAULT_POOL_LIMIT,
        }
    }
}

impl PoolQuery {
    pub fn parse(params: PoolQueryParams) -> Result<Self, QueryError> {
        let risk_level = params
            .risk_level
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|message| QueryError {
                param: "riskLevel",
                message,
            })?;
        let trend = params
            .trend
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|message| QueryError {
                param: "trend",
                message,
            })?;
        let sort_by = params
            .sort_by
            .as_deref()
            .map(str::parse)
            .transpose()
            .map_err(|message| QueryError {
                param: "sortBy",
                message,
            })?
            .unwrap_or_default();

        Ok(PoolQuery {
            chain: params.chain,
            protocol: params.protocol,
            yields_only: params.yields_only.unwrap_or(false),
            min_apy: params.min_apy,
            max_apy: params.max_apy,
            stablecoin_only: params.stablecoin_only.or(params.stable_only).unwrap_or(false),
            risk_level,
            max_risk_score: params.max_risk_score,
            min_stability: params.min_stability,
            trend,
            sort_by,
            limit: params.limit.or(params.yield_limit).unwrap_or(DEFAULT_POOL_LIMIT),
        })
    }

    /// Filter, sort, and truncate a snapshot's pools.
    pub fn apply(&self, pools: &[Pool]) -> Vec<Pool> {
        let mut selected: Vec<&Pool> = pools
            .iter()
            .filter(|p| self.matches(p))
            .collect();

        match self.sort_by {
            SortBy::Tvl => sort_desc(&mut selected, |p| p.tvl_usd),
            SortBy::Apy => sort_desc(&mut selected, |p| p.apy),
            SortBy::Risk => sort_desc(&mut selected, |p| -p.risk_score),
            // Pools without a stability summary sort last.
            SortBy::Stability => sort_desc(&mut selected, |p| {
                p.apy_stability.map(|s| s.score).unwrap_or(-1.0)
            }),
        }

        selected.truncate(self.limit);
        selected.into_iter().cloned().collect()
    }

    fn matches(&self, p: &Pool) -> bool {
        if let Some(chain) = &self.chain {
            if !p.chain.eq_ignore_ascii_case(chain) {
                return false;
            }
        }
        if let Some(protocol) = &self.protocol {
            if !p.protocol_slug.eq_ignore_ascii_case(protocol) {
                return false;
            }
        }
        if self.yields_only && p.apy <= 0.0 {
            return false;
        }
        if self.min_apy.is_some_and(|min| p.apy < min) {
            return false;
        }
        if self.max_apy.is_some_and(|max| p.apy > max) {
            return false;
        }
        if self.stablecoin_only && !p.stablecoin {
            return false;
        }
        if self.risk_level.is_some_and(|level| p.risk_level != level) {
            return false;
        }
        if self.max_risk_score.is_some_and(|max| p.risk_score > max) {
            return false;
        }
        if let Some(min) = self.min_stability {
            match p.apy_stability {
                Some(s) if s.score >= min => {}
                _ => return false,
            }
        }
        if let Some(trend) = self.trend {
            match p.apy_stability {
                Some(s) if s.trend == trend => {}
                _ => return false,
            }
        }
        true
    }
}

fn sort_desc(pools: &mut [&Pool], key: impl Fn(&Pool) -> f64) {
    pools.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.id.cmp(&b.id))
    });
}

// ── Graph / spread queries ──────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphQueryParams {
    pub category: Option<String>,
    pub chain: Option<String>,
    #[serde(rename = "type")]
    pub rel_type: Option<String>,
    pub min_tvl: Option<f64>,
    pub limit: Option<usize>,
}

impl GraphQueryParams {
    pub fn parse(self) -> Result<crate::analytics::GraphFilters, QueryError> {
        let rel_type = self
            .rel_type
            .as_deref()
            .map(str::parse::<RelationshipType>)
            .transpose()
            .map_err(|message| QueryError {
                param: "type",
                message,
            })?;
        Ok(crate::analytics::GraphFilters {
            category: self.category,
            chain: self.chain,
            min_tvl: self.min_tvl,
            rel_type,
            limit: self.limit,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpreadQueryParams {
    pub chain: Option<String>,
    pub min_spread: Option<f64>,
}

impl SpreadQueryParams {
    pub fn min_spread_pct(&self) -> f64 {
        self.min_spread.unwrap_or(DEFAULT_MIN_SPREAD_PCT)
    }
}
