
use fixtures_common::{pool_with_risk, protocol};
use yieldscope::analytics::ProtocolAggregator;

#[test]
fn rollup_basics() {
    let proto = protocol("aave", "Lending", &["ethereum"], 15_000_000.0);
    let p1 = pool_with_risk("p1", "aave", "ethereum", "USDC", 10_000_000.0, 4.0, 20.0);
    let p2 = pool_with_risk("p2", "aave", "ethereum", "DAI", 5_000_000.0, 10.0, 30.0);
    let pools = vec![&p1, &p2];

    let s = ProtocolAggregator::aggregate(&proto, &pools).unwrap();
    assert_eq!(s.pool_count, 2);
    assert_eq!(s.total_tvl, 15_000_000.0);
    // TVL-weighted: (4*10M + 10*5M) / 15M = 6.0
    assert!((s.avg_apy - 6.0).abs() < 1e-9);
    assert_eq!(s.avg_risk_score, 25.0);
    assert_eq!(s.min_risk_score, 20.0);
    assert_eq!(s.max_apy, 10.0);
    assert_eq!(s.top_pool.as_deref(), Some("p1"));
}

#[test]
fn protocol_without_pools_has_no_summary() {
    let proto = protocol("ghost", "Dexes", &["base"], 0.0);
    assert!(ProtocolAggregator::aggregate(&proto, &[]).is_none());
}

#[test]
fn safer_bigger_protocol_earns_more_trust() {
    let blue = protocol("blue", "Lending", &["ethereum"], 0.0);
    let degen = protocol("degen", "Yield", &["ethereum"], 0.0);

    let blue_pools: Vec<_> = (0..5)
        .map(|i| {
            pool_with_risk(
                &format!("b{i}"),
                "blue",
                "ethereum",
                "USDC",
                100_000_000.0,
                4.0,
                10.0,
            )
        })
        .collect();
    let degen_pools: Vec<_> = (0..2)
        .map(|i| {
            pool_with_risk(
                &format!("d{i}"),
                "degen",
                "ethereum",
                "WOOF",
                50_000.0,
                200.0,
                85.0,
            )
        })
        .collect();

    let blue_refs: Vec<_> = blue_pools.iter().collect();
    let degen_refs: Vec<_> = degen_pools.iter().collect();

    let blue_summary = ProtocolAggregator::aggregate(&blue, &blue_refs).unwrap();
    let degen_summary = ProtocolAggregator::aggregate(&degen, &degen_refs).unwrap();

    assert!(blue_summary.trust_score > degen_summary.trust_score);
    assert!((0.0..=100.0).contains(&blue_summary.trust_score));
    assert!((0.0..=100.0).contains(&degen_summary.trust_score));
}

#[test]
fn highlights_pick_the_right_winners() {
    let big = protocol("big", "Lending", &["ethereum"], 0.0);
    let hot = protocol("hot", "Yield", &["ethereum"], 0.0);

    let big_pool = pool_with_risk("b", "big", "ethereum", "USDC", 500_000_000.0, 3.0, 8.0);
    let hot_pool = pool_with_risk("h", "hot", "ethereum", "USDC", 2_000_000.0, 45.0, 60.0);

    let summaries = vec![
        ProtocolAggregator::aggregate(&big, &[&big_pool]).unwrap(),
        ProtocolAggregator::aggregate(&hot, &[&hot_pool]).unwrap(),
    ];

    let h = ProtocolAggregator::highlights(&summaries);
    assert_eq!(h.highest_tvl.as_deref(), Some("big"));
    assert_eq!(h.highest_apy.as_deref(), Some("hot"));
    assert_eq!(h.lowest_risk.as_deref(), Some("big"));
    assert!(h.best_risk_adjusted.is_some());
    assert!(h.most_pools.is_some());
}

#[test]
fn highlights_of_nothing_are_all_none() {
    let h = ProtocolAggregator::highlights(&[]);
    assert!(h.highest_tvl.is_none());
    assert!(h.highest_apy.is_none());
    assert!(h.lowest_risk.is_none());
    assert!(h.best_risk_adjusted.is_none());
    assert!(h.most_pools.is_none());
}
