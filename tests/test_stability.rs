
use fixtures_common::daily_series;
use yieldscope::model::Trend;
use yieldscope::score::StabilityAnalyzer;
use yieldscope::score::stability::MIN_DATA_POINTS;

const NOW: i64 = 1_756_600_000;

#[test]
fn too_few_points_yields_absent() {
    let series = daily_series(NOW, &[5.0, 5.1, 5.2]);
    assert!(StabilityAnalyzer::analyze(&series, 30).is_none());
}

#[test]
fn boundary_point_count() {
    let four = daily_series(NOW, &[5.0; 4]);
    assert!(StabilityAnalyzer::analyze(&four, 30).is_none());

    let five = daily_series(NOW, &[5.0; 5]);
    assert!(StabilityAnalyzer::analyze(&five, 30).is_some());
    assert_eq!(MIN_DATA_POINTS, 5);
}

#[test]
fn constant_series_is_perfectly_stable() {
    let series = daily_series(NOW, &[7.5; 10]);
    let s = StabilityAnalyzer::analyze(&series, 30).unwrap();
    assert_eq!(s.volatility, 0.0);
    assert_eq!(s.score, 100.0);
    assert_eq!(s.trend, Trend::Stable);
    assert_eq!(s.avg_apy, 7.5);
    assert_eq!(s.data_points, 10);
}

#[test]
fn avg_between_min_and_max() {
    let series = daily_series(NOW, &[3.0, 9.0, 4.5, 6.0, 7.0, 5.5]);
    let s = StabilityAnalyzer::analyze(&series, 30).unwrap();
    assert!(s.avg_apy >= s.min_apy && s.avg_apy <= s.max_apy);
    assert_eq!(s.min_apy, 3.0);
    assert_eq!(s.max_apy, 9.0);
}

#[test]
fn zero_mean_series_scores_zero() {
    // Stable at zero is not "stable and valuable".
    let series = daily_series(NOW, &[0.0; 8]);
    let s = StabilityAnalyzer::analyze(&series, 30).unwrap();
    assert_eq!(s.score, 0.0);
}

#[test]
fn higher_dispersion_scores_lower() {
    let calm = daily_series(NOW, &[5.0, 5.2, 4.9, 5.1, 5.0, 5.05]);
    let wild = daily_series(NOW, &[1.0, 12.0, 3.0, 9.0, 0.5, 6.0]);
    let calm_score = StabilityAnalyzer::analyze(&calm, 30).unwrap().score;
    let wild_score = StabilityAnalyzer::analyze(&wild, 30).unwrap().score;
    assert!(calm_score > wild_score);
}

#[test]
fn rising_series_trends_up() {
    let series = daily_series(NOW, &[4.0, 4.0, 4.0, 8.0, 8.0, 8.0]);
    let s = StabilityAnalyzer::analyze(&series, 30).unwrap();
    assert_eq!(s.trend, Trend::Up);
}

#[test]
fn falling_series_trends_down() {
    let series = daily_series(NOW, &[8.0, 8.0, 8.0, 4.0, 4.0, 4.0]);
    let s = StabilityAnalyzer::analyze(&series, 30).unwrap();
    assert_eq!(s.trend, Trend::Down);
}

#[test]
fn small_wiggle_is_stable() {
    let series = daily_series(NOW, &[5.0, 5.0, 5.0, 5.1, 5.1, 5.1]);
    let s = StabilityAnalyzer::analyze(&series, 30).unwrap();
    assert_eq!(s.trend, Trend::Stable);
}

#[test]
fn points_outside_window_are_ignored() {
    // 4 recent points + 4 ancient ones: the window leaves too few.
    let mut series = daily_series(NOW, &[5.0; 4]);
    series.extend(daily_series(NOW - 90 * 86_400, &[5.0; 4]));
    assert!(StabilityAnalyzer::analyze(&series, 30).is_none());
}
