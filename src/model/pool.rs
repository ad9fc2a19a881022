use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A unique pool identifier (the aggregator's pool UUID/slug).
pub type PoolId = String;

// ── Risk enums ──────────────────────────────────────────────────────

/// Impermanent-loss exposure reported by the upstream feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IlRisk {
    None,
    Low,
    Medium,
    High,
}

impl Default for IlRisk {
    fn default() -> Self {
        IlRisk::None
    }
}

/// Composite risk bucket, derived deterministically from the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    /// Bucket thresholds: [0,25) low, [25,50) medium, [50,75) high, [75,100] very_high.
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            RiskLevel::Low
        } else if score < 50.0 {
            RiskLevel::Medium
        } else if score < 75.0 {
            RiskLevel::High
        } else {
            RiskLevel::VeryHigh
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
        }
    }
}

impl std::str::FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "very_high" => Ok(RiskLevel::VeryHigh),
            other => Err(format!("unknown risk level `{other}`")),
        }
    }
}

/// Per-factor breakdown behind a composite risk score. Each sub-score is in [0,100].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdown {
    pub tvl_score: f64,
    pub apy_score: f64,
    pub stable_score: f64,
    pub il_score: f64,
    pub protocol_score: f64,
}

// ── APY stability ───────────────────────────────────────────────────

/// Direction of recent APY movement within the analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl std::str::FromStr for Trend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Trend::Up),
            "down" => Ok(Trend::Down),
            "stable" => Ok(Trend::Stable),
            other => Err(format!("unknown trend `{other}`")),
        }
    }
}

/// Historical APY stability summary. Present only when the pool has enough history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApyStability {
    /// Stability score in [0,100]; higher = steadier yield.
    pub score: f64,
    /// Population standard deviation of APY over the window.
    pub volatility: f64,
    pub avg_apy: f64,
    pub min_apy: f64,
    pub max_apy: f64,
    pub trend: Trend,
    /// Number of observations the summary was computed from.
    pub data_points: usize,
}

/// One observation in a pool's APY history (unix seconds, percent APY).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub struct ApyPoint {
    pub timestamp: i64,
    pub apy: f64,
}

// ── Pool ────────────────────────────────────────────────────────────

/// A scored yield pool. Numeric fields are sanitized at the ingestion boundary;
/// `risk_score`/`risk_level`/`apy_stability` are derived, never taken from the feed.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    pub id: PoolId,
    pub chain: String,
    pub protocol_slug: String,
    pub symbol: String,
    pub tvl_usd: f64,
    /// Total APY in percent (= apy_base + apy_reward).
    pub apy: f64,
    pub apy_base: f64,
    pub apy_reward: f64,
    pub stablecoin: bool,
    pub il_risk: IlRisk,
    /// Underlying asset symbols, compared order-independently.
    pub underlying_assets: Vec<String>,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub risk_breakdown: RiskBreakdown,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apy_stability: Option<ApyStability>,
    /// Raw history, kept for the narrative generator (trimmed to the most
    /// recent 30 points when passed on).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub apy_history: Vec<ApyPoint>,
}

impl Pool {
    /// Canonical signature for grouping economically equivalent pools:
    /// sorted, uppercased, deduped underlying assets. Falls back to the
    /// pool symbol when the feed reported no underlying set.
    pub fn asset_signature(&self) -> String {
        if self.underlying_assets.is_empty() {
            return self.symbol.to_uppercase();
        }
        let mut assets: Vec<String> = self
            .underlying_assets
            .iter()
            .map(|a| a.to_uppercase())
            .collect();
        assets.sort();
        assets.dedup();
        assets.join("-")
    }
}
