use crate::model::{IlRisk, RiskBreakdown, RiskLevel};

/// Sub-score weights. Sum to 1.0 so the composite stays in [0,100].
const W_TVL: f64 = 0.30;
const W_APY: f64 = 0.25;
const W_STABLE: f64 = 0.15;
const W_IL: f64 = 0.15;
const W_PROTOCOL: f64 = 0.15;

/// Penalty for holding volatile (non-stablecoin) assets.
const VOLATILE_PENALTY: f64 = 60.0;

/// Protocol maturity score assumed when no reputation input exists.
const UNKNOWN_MATURITY: f64 = 50.0;

/// Composite risk assessment for a single pool.
#[derive(Debug, Clone, Copy)]
pub struct RiskAssessment {
    pub breakdown: RiskBreakdown,
    pub score: f64,
    pub level: RiskLevel,
    /// True when an input had to be sanitized (negative/NaN tvl or apy).
    pub sanitized: bool,
}

/// Pure risk scorer: raw pool attributes in, composite score out.
/// Dirty upstream feeds are expected — negative or NaN numerics are clamped
/// to zero (which itself scores as maximum liquidity risk) instead of
/// aborting the batch.
pub struct RiskScorer;

impl RiskScorer {
    pub fn score(
        tvl_usd: f64,
        apy: f64,
        stablecoin: bool,
        il_risk: IlRisk,
        protocol_maturity: Option<f64>,
    ) -> RiskAssessment {
        let (tvl_usd, tvl_dirty) = sanitize(tvl_usd);
        let (apy, apy_dirty) = sanitize(apy);

        let breakdown = RiskBreakdown {
            tvl_score: tvl_score(tvl_usd),
            apy_score: apy_score(apy),
            stable_score: if stablecoin { 0.0 } else { VOLATILE_PENALTY },
            il_score: il_score(il_risk),
            protocol_score: protocol_score(protocol_maturity),
        };

        let score = (W_TVL * breakdown.tvl_score
            + W_APY * breakdown.apy_score
            + W_STABLE * breakdown.stable_score
            + W_IL * breakdown.il_score
            + W_PROTOCOL * breakdown.protocol_score)
            .clamp(0.0, 100.0);

        RiskAssessment {
            breakdown,
            score,
            level: RiskLevel::from_score(score),
            sanitized: tvl_dirty || apy_dirty,
        }
    }
}

fn sanitize(v: f64) -> (f64, bool) {
    if v.is_finite() && v >= 0.0 {
        (v, false)
    } else {
        (0.0, true)
    }
}

/// Liquidity risk: decreasing in log10(tvl). 0 at ≥$100M, 50 at $1M,
/// 100 at ≤$10K.
fn tvl_score(tvl_usd: f64) -> f64 {
    ((8.0 - (tvl_usd + 1.0).log10()) * 25.0).clamp(0.0, 100.0)
}

/// Yield-sustainability risk: low APY carries near-zero penalty, extreme APY
/// (typically reward-emission driven) is itself a risk signal.
fn apy_score(apy: f64) -> f64 {
    if apy <= 50.0 {
        apy
    } else if apy <= 200.0 {
        50.0 + (apy - 50.0) / 3.0
    } else {
        100.0
    }
}

fn il_score(il: IlRisk) -> f64 {
    match il {
        IlRisk::None => 0.0,
        IlRisk::Low => 30.0,
        IlRisk::Medium => 60.0,
        IlRisk::High => 100.0,
    }
}

fn protocol_score(maturity: Option<f64>) -> f64 {
    let maturity = maturity.unwrap_or(UNKNOWN_MATURITY);
    (100.0 - maturity).clamp(0.0, 100.0)
}
