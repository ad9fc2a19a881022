use crate::model::{ApyPoint, ApyStability, Trend};

/// Minimum observations required before a stability summary is produced.
pub const MIN_DATA_POINTS: usize = 5;

/// Relative change between sub-window means that counts as a trend.
const TREND_THRESHOLD: f64 = 0.05;

const SECS_PER_DAY: i64 = 86_400;

/// Pure APY time-series analyzer.
pub struct StabilityAnalyzer;

impl StabilityAnalyzer {
    /// Analyze an ordered APY series over a trailing window (days, relative to
    /// the newest observation). Returns `None` when fewer than
    /// [`MIN_DATA_POINTS`] observations fall inside the window.
    pub fn analyze(series: &[ApyPoint], window_days: u32) -> Option<ApyStability> {
        let newest = series.iter().map(|p| p.timestamp).max()?;
        let cutoff = newest - window_days as i64 * SECS_PER_DAY;

        let mut window: Vec<&ApyPoint> =
            series.iter().filter(|p| p.timestamp >= cutoff).collect();
        if window.len() < MIN_DATA_POINTS {
            return None;
        }
        window.sort_by_key(|p| p.timestamp);

        let apys: Vec<f64> = window.iter().map(|p| p.apy).collect();
        let n = apys.len() as f64;
        let avg_apy = apys.iter().sum::<f64>() / n;
        let min_apy = apys.iter().copied().fold(f64::INFINITY, f64::min);
        let max_apy = apys.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        // Population standard deviation
        let variance = apys.iter().map(|a| (a - avg_apy).powi(2)).sum::<f64>() / n;
        let volatility = variance.sqrt();

        // Coefficient-of-variation score: higher dispersion relative to the
        // mean means lower stability. A zero-mean series scores 0, not 100 —
        // "stable at zero" is not a stability signal worth rewarding.
        let score = if avg_apy > 0.0 {
            (100.0 - 100.0 * volatility / avg_apy).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Some(ApyStability {
            score,
            volatility,
            avg_apy,
            min_apy,
            max_apy,
            trend: classify_trend(&apys),
            data_points: apys.len(),
        })
    }
}

/// Compare the mean of the recent half of the window against the earlier half.
fn classify_trend(apys: &[f64]) -> Trend {
    let mid = apys.len() / 2;
    let earlier = &apys[..mid];
    let recent = &apys[mid..];

    let earlier_avg = earlier.iter().sum::<f64>() / earlier.len() as f64;
    let recent_avg = recent.iter().sum::<f64>() / recent.len() as f64;

    if earlier_avg == 0.0 {
        return if recent_avg > 0.0 { Trend::Up } else { Trend::Stable };
    }

    let change = (recent_avg - earlier_avg) / earlier_avg;
    if change > TREND_THRESHOLD {
        Trend::Up
    } else if change < -TREND_THRESHOLD {
        Trend::Down
    } else {
        Trend::Stable
    }
}
