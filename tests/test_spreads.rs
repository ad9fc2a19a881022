
use fixtures_common::pool_with_risk;
use yieldscope::analytics::{Confidence, SpreadDetector};
use yieldscope::model::ApyStability;
use yieldscope::model::Trend;

fn stability(score: f64) -> ApyStability {
    ApyStability {
        score,
        volatility: 0.5,
        avg_apy: 5.0,
        min_apy: 4.0,
        max_apy: 6.0,
        trend: Trend::Stable,
        data_points: 10,
    }
}

#[test]
fn usdc_spread_scenario() {
    // Protocol X: 12% on $5M at risk 30; protocol Y: 4% on $50M at risk 10.
    let x = pool_with_risk("x", "proto-x", "ethereum", "USDC", 5_000_000.0, 12.0, 30.0);
    let y = pool_with_risk("y", "proto-y", "ethereum", "USDC", 50_000_000.0, 4.0, 10.0);

    let spreads = SpreadDetector::find_spreads(&[x, y], None, 0.5);
    assert_eq!(spreads.len(), 1);

    let s = &spreads[0];
    assert_eq!(s.high_pool.id, "x");
    assert_eq!(s.low_pool.id, "y");
    assert!((s.apy_spread - 8.0).abs() < 1e-9);
    // X is riskier, so the net spread is penalized below the raw spread.
    assert!(s.net_spread < s.apy_spread);
    // Liquidity floor is met on both sides but neither has stability history.
    assert_eq!(s.confidence, Confidence::Medium);
    assert_eq!(s.min_liquidity, 5_000_000.0);
    assert_eq!(s.asset_type, "stablecoin");
}

#[test]
fn high_pool_strictly_out_yields_low_pool() {
    let a = pool_with_risk("a", "p1", "base", "USDT", 2_000_000.0, 7.0, 20.0);
    let b = pool_with_risk("b", "p2", "base", "USDT", 3_000_000.0, 5.0, 20.0);
    let spreads = SpreadDetector::find_spreads(&[a, b], None, 0.1);
    for s in &spreads {
        assert!(s.high_pool.apy > s.low_pool.apy);
        assert!(s.net_spread <= s.apy_spread);
    }
}

#[test]
fn no_penalty_when_high_pool_is_safer() {
    let safe_high = pool_with_risk("a", "p1", "base", "USDT", 2_000_000.0, 8.0, 10.0);
    let risky_low = pool_with_risk("b", "p2", "base", "USDT", 3_000_000.0, 5.0, 40.0);
    let spreads = SpreadDetector::find_spreads(&[safe_high, risky_low], None, 0.1);
    assert_eq!(spreads.len(), 1);
    assert_eq!(spreads[0].net_spread, spreads[0].apy_spread);
}

#[test]
fn single_protocol_group_produces_no_spread() {
    let a = pool_with_risk("a", "solo", "base", "USDC", 2_000_000.0, 10.0, 20.0);
    let b = pool_with_risk("b", "solo", "base", "USDC", 3_000_000.0, 2.0, 20.0);
    assert!(SpreadDetector::find_spreads(&[a, b], None, 0.1).is_empty());
}

#[test]
fn below_threshold_spread_is_dropped() {
    let a = pool_with_risk("a", "p1", "base", "USDC", 2_000_000.0, 5.3, 20.0);
    let b = pool_with_risk("b", "p2", "base", "USDC", 3_000_000.0, 5.0, 20.0);
    assert!(SpreadDetector::find_spreads(&[a.clone(), b.clone()], None, 0.5).is_empty());
    assert_eq!(SpreadDetector::find_spreads(&[a, b], None, 0.2).len(), 1);
}

#[test]
fn different_chains_never_pair() {
    let a = pool_with_risk("a", "p1", "ethereum", "USDC", 2_000_000.0, 12.0, 20.0);
    let b = pool_with_risk("b", "p2", "arbitrum", "USDC", 3_000_000.0, 4.0, 20.0);
    assert!(SpreadDetector::find_spreads(&[a, b], None, 0.5).is_empty());
}

#[test]
fn chain_casing_does_not_split_groups() {
    let a = pool_with_risk("a", "p1", "Ethereum", "USDC", 2_000_000.0, 12.0, 20.0);
    let b = pool_with_risk("b", "p2", "ethereum", "USDC", 3_000_000.0, 4.0, 20.0);
    let spreads = SpreadDetector::find_spreads(&[a, b], None, 0.5);
    assert_eq!(spreads.len(), 1);
    assert_eq!(spreads[0].apy_spread, 8.0);
}

#[test]
fn chain_filter_narrows_the_search() {
    let a = pool_with_risk("a", "p1", "ethereum", "USDC", 2_000_000.0, 12.0, 20.0);
    let b = pool_with_risk("b", "p2", "ethereum", "USDC", 3_000_000.0, 4.0, 20.0);
    let c = pool_with_risk("c", "p3", "arbitrum", "USDC", 2_000_000.0, 15.0, 20.0);
    let d = pool_with_risk("d", "p4", "arbitrum", "USDC", 3_000_000.0, 3.0, 20.0);

    let all = SpreadDetector::find_spreads(&[a.clone(), b.clone(), c, d], None, 0.5);
    assert_eq!(all.len(), 2);

    let eth_only = SpreadDetector::find_spreads(&[a, b], Some("ethereum"), 0.5);
    assert_eq!(eth_only.len(), 1);
    assert_eq!(eth_only[0].high_pool.chain, "ethereum");
}

#[test]
fn confidence_high_needs_liquidity_and_history() {
    let mut a = pool_with_risk("a", "p1", "base", "USDC", 5_000_000.0, 10.0, 20.0);
    let mut b = pool_with_risk("b", "p2", "base", "USDC", 8_000_000.0, 4.0, 20.0);
    a.apy_stability = Some(stability(90.0));
    b.apy_stability = Some(stability(85.0));

    let spreads = SpreadDetector::find_spreads(&[a, b], None, 0.5);
    assert_eq!(spreads[0].confidence, Confidence::High);
}

#[test]
fn confidence_low_when_both_conditions_fail() {
    let a = pool_with_risk("a", "p1", "base", "USDC", 50_000.0, 30.0, 20.0);
    let b = pool_with_risk("b", "p2", "base", "USDC", 80_000.0, 4.0, 20.0);
    let spreads = SpreadDetector::find_spreads(&[a, b], None, 0.5);
    assert_eq!(spreads[0].confidence, Confidence::Low);
}

#[test]
fn emission_driven_spread_is_flagged() {
    // High pool's yield is almost entirely reward emissions.
    let mut high = pool_with_risk("a", "p1", "base", "USDC", 5_000_000.0, 20.0, 20.0);
    high.apy_base = 2.0;
    high.apy_reward = 18.0;
    let mut low = pool_with_risk("b", "p2", "base", "USDC", 8_000_000.0, 3.0, 20.0);
    low.apy_base = 3.0;
    low.apy_reward = 0.0;

    let spreads = SpreadDetector::find_spreads(&[high, low], None, 0.5);
    assert!(!spreads[0].is_base_apy_driven);
}

#[test]
fn base_driven_spread_is_flagged() {
    let a = pool_with_risk("a", "p1", "base", "USDC", 5_000_000.0, 10.0, 20.0);
    let b = pool_with_risk("b", "p2", "base", "USDC", 8_000_000.0, 4.0, 20.0);
    // fixtures set apy_base = apy, so the whole spread is base-driven
    let spreads = SpreadDetector::find_spreads(&[a, b], None, 0.5);
    assert!(spreads[0].is_base_apy_driven);
}

#[test]
fn detection_is_deterministic() {
    let pools: Vec<_> = (0..20)
        .map(|i| {
            pool_with_risk(
                &format!("p{i}"),
                &format!("proto{}", i % 5),
                if i % 2 == 0 { "ethereum" } else { "base" },
                if i % 3 == 0 { "USDC" } else { "WETH" },
                1_000_000.0 + i as f64 * 250_000.0,
                2.0 + i as f64 * 0.7,
                10.0 + i as f64,
            )
        })
        .collect();

    let first = SpreadDetector::find_spreads(&pools, None, 0.2);
    let second = SpreadDetector::find_spreads(&pools, None, 0.2);

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.high_pool.id, b.high_pool.id);
        assert_eq!(a.low_pool.id, b.low_pool.id);
        assert_eq!(a.net_spread, b.net_spread);
    }
    // Sorted by net spread descending
    for w in first.windows(2) {
        assert!(w[0].net_spread >= w[1].net_spread);
    }
}

#[test]
fn asset_signature_ignores_ordering() {
    let mut a = pool_with_risk("a", "p1", "base", "WETH-USDC", 5_000_000.0, 12.0, 20.0);
    a.underlying_assets = vec!["WETH".into(), "USDC".into()];
    let mut b = pool_with_risk("b", "p2", "base", "USDC-WETH", 8_000_000.0, 4.0, 20.0);
    b.underlying_assets = vec!["usdc".into(), "weth".into()];

    let spreads = SpreadDetector::find_spreads(&[a, b], None, 0.5);
    assert_eq!(spreads.len(), 1, "order/case of underlying assets must not matter");
}
