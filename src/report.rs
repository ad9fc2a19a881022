use std::path::Path;

use anyhow::Result;

use crate::analytics::{GraphFilters, RelationshipGraphBuilder, SpreadDetector};
use crate::ingest;
use crate::model::Protocol;
use crate::query::{PoolQuery, SortBy};

/// Entry point for the `score` subcommand: print a per-pool risk table.
pub fn run_score(file: &Path, sort: &str, limit: usize) -> Result<()> {
    let sort_by: SortBy = sort
        .parse()
        .map_err(|e| anyhow::anyhow!("--sort: {e}"))?;
    let snapshot = ingest::load_file_snapshot(file)?;

    let query = PoolQuery {
        sort_by,
        limit,
        ..Default::default()
    };
    let pools = query.apply(&snapshot.pools);

    println!(
        "{:<28} {:<12} {:<10} {:>12} {:>8} {:>6} {:<10}",
        "POOL", "PROTOCOL", "CHAIN", "TVL", "APY%", "RISK", "LEVEL"
    );
    for p in &pools {
        println!(
            "{:<28} {:<12} {:<10} {:>12.0} {:>8.2} {:>6.1} {:<10}",
            truncate(&p.symbol, 28),
            truncate(&p.protocol_slug, 12),
            truncate(&p.chain, 10),
            p.tvl_usd,
            p.apy,
            p.risk_score,
            p.risk_level.as_str(),
        );
    }
    println!(
        "\n{} of {} pools (snapshot v{}, {} warning(s))",
        pools.len(),
        snapshot.metadata.pool_count,
        snapshot.metadata.version,
        snapshot.metadata.warnings.len()
    );
    Ok(())
}

/// Entry point for the `spreads` subcommand.
pub fn run_spreads(file: &Path, chain: Option<&str>, min_spread: f64) -> Result<()> {
    let snapshot = ingest::load_file_snapshot(file)?;
    let spreads = SpreadDetector::find_spreads(&snapshot.pools, chain, min_spread);

    if spreads.is_empty() {
        println!("No spreads ≥ {min_spread}% found.");
        return Ok(());
    }

    for s in &spreads {
        println!(
            "{:<16} {:>6.2}% gross / {:>6.2}% net  {} ({:.2}%) vs {} ({:.2}%)  conf={:?}{}",
            s.asset,
            s.apy_spread,
            s.net_spread,
            s.high_pool.protocol_slug,
            s.high_pool.apy,
            s.low_pool.protocol_slug,
            s.low_pool.apy,
            s.confidence,
            if s.is_base_apy_driven { "  [base-driven]" } else { "" },
        );
    }
    println!("\n{} spread(s)", spreads.len());
    Ok(())
}

/// Entry point for the `graph` subcommand: print the filtered graph as JSON.
pub fn run_graph(file: &Path, filters: GraphFilters) -> Result<()> {
    let snapshot = ingest::load_file_snapshot(file)?;
    let protocols: Vec<&Protocol> = snapshot.protocols.values().collect();
    let graph = RelationshipGraphBuilder::build(&protocols, &snapshot.relationships, &filters);
    println!("{}", serde_json::to_string_pretty(&graph)?);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    }
}
