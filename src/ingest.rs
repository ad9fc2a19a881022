use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::model::pool::{ApyPoint, IlRisk, Pool};
use crate::model::snapshot::{RawPool, RawSnapshot, Snapshot, SnapshotMetadata};
use crate::model::{Protocol, Relationship};
use crate::score::risk::RiskScorer;
use crate::score::stability::StabilityAnalyzer;

/// Days of history the stability analyzer looks at.
pub const STABILITY_WINDOW_DAYS: u32 = 30;

/// Timeout for fetching a snapshot over HTTP.
const FETCH_TIMEOUT_SECS: u64 = 30;

const FETCH_RETRIES: u32 = 3;

/// Where the ingestion pipeline publishes snapshots.
#[derive(Debug, Clone)]
pub enum SnapshotSource {
    File(PathBuf),
    Url(String),
}

impl SnapshotSource {
    /// Treat anything that parses as http(s) as a URL, else as a path.
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            SnapshotSource::Url(s.to_string())
        } else {
            SnapshotSource::File(PathBuf::from(s))
        }
    }
}

/// Load and convert a snapshot. Fails closed: an unreachable source or
/// unparseable payload is an error, never a silently empty dataset.
pub async fn load(source: &SnapshotSource) -> Result<Snapshot> {
    let raw = match source {
        SnapshotSource::File(path) => load_file(path)?,
        SnapshotSource::Url(url) => load_url(url).await?,
    };
    Ok(convert(raw))
}

/// Blocking variant for CLI subcommands that read a local file.
pub fn load_file_snapshot(path: &Path) -> Result<Snapshot> {
    Ok(convert(load_file(path)?))
}

fn load_file(path: &Path) -> Result<RawSnapshot> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing snapshot file {}", path.display()))
}

async fn load_url(url: &str) -> Result<RawSnapshot> {
    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .context("building HTTP client")?;

    retry(FETCH_RETRIES, non_retryable, || {
        let client = client.clone();
        let url = url.to_string();
        async move {
            let raw = client
                .get(&url)
                .send()
                .await?
                .error_for_status()?
                .json::<RawSnapshot>()
                .await?;
            Ok(raw)
        }
    })
    .await
    .with_context(|| format!("fetching snapshot from {url}"))
}

/// A 4xx response cannot succeed on retry; everything else (transport
/// errors, timeouts, 5xx) is worth another attempt.
fn non_retryable(err: &anyhow::Error) -> bool {
    err.downcast_ref::<reqwest::Error>()
        .and_then(|e| e.status())
        .is_some_and(|s| s.is_client_error())
}

/// Retry an async operation with exponential backoff, bailing out early
/// when `give_up` classifies the error as permanent.
async fn retry<T, F, Fut>(
    max_retries: u32,
    give_up: impl Fn(&anyhow::Error) -> bool,
    f: F,
) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let mut last_err = None;
    for attempt in 0..=max_retries {
        match f().await {
            Ok(val) => return Ok(val),
            Err(e) => {
                let permanent = give_up(&e);
                last_err = Some(e);
                if permanent {
                    break;
                }
                if attempt < max_retries {
                    let delay = std::time::Duration::from_millis(1000 * 2u64.pow(attempt));
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
    Err(last_err.expect("at least one attempt ran"))
}

// ── Raw → typed conversion ──────────────────────────────────────────

/// Validate and score the raw dataset. Per-record problems (malformed
/// numerics, unknown relationship endpoints) are sanitized or dropped and
/// recorded as warnings — a dirty record never aborts the batch.
pub fn convert(raw: RawSnapshot) -> Snapshot {
    let mut warnings = Vec::new();

    let protocols: std::collections::BTreeMap<String, Protocol> = raw
        .protocols
        .into_iter()
        .map(|(slug, p)| {
            let protocol = Protocol {
                slug: slug.clone(),
                name: p.name.unwrap_or_else(|| slug.clone()),
                category: p.category.unwrap_or_else(|| "Unknown".to_string()),
                chains: p.chains,
                tvl: p.tvl.unwrap_or(0.0).max(0.0),
                maturity_score: p.maturity_score,
            };
            (slug, protocol)
        })
        .collect();

    let pools: Vec<Pool> = raw
        .pools
        .into_iter()
        .map(|rp| {
            let (pool, dirty) = convert_pool(rp, &protocols);
            if dirty {
                warnings.push(format!("pool {}: sanitized malformed numerics", pool.id));
            }
            pool
        })
        .collect();

    let relationships: Vec<Relationship> = raw
        .relationships
        .into_iter()
        .filter_map(|r| {
            if !protocols.contains_key(&r.source) || !protocols.contains_key(&r.target) {
                warnings.push(format!(
                    "relationship {} -> {}: unknown endpoint, dropped",
                    r.source, r.target
                ));
                return None;
            }
            let rel_type = match r.rel_type.parse() {
                Ok(t) => t,
                Err(e) => {
                    warnings.push(format!("relationship {} -> {}: {e}, dropped", r.source, r.target));
                    return None;
                }
            };
            Some(Relationship {
                source: r.source,
                target: r.target,
                rel_type,
                weight: r.weight.unwrap_or(0.5).clamp(0.0, 1.0),
                evidence: r.evidence.unwrap_or_default(),
            })
        })
        .collect();

    let metadata = SnapshotMetadata {
        version: raw
            .metadata
            .version
            .unwrap_or_else(|| Utc::now().timestamp().to_string()),
        fetched_at: raw.metadata.fetched_at.unwrap_or_else(|| Utc::now().timestamp()),
        protocol_count: protocols.len(),
        pool_count: pools.len(),
        warnings,
    };

    Snapshot {
        protocols,
        relationships,
        pools,
        metadata,
    }
}

fn convert_pool(
    raw: RawPool,
    protocols: &std::collections::BTreeMap<String, Protocol>,
) -> (Pool, bool) {
    let protocol_slug = raw.project.unwrap_or_default();
    let maturity = protocols
        .get(&protocol_slug)
        .and_then(|p| p.maturity_score);

    let il_risk = match raw.il_risk.as_deref() {
        Some("no") | Some("none") | None => IlRisk::None,
        Some("low") => IlRisk::Low,
        Some("medium") => IlRisk::Medium,
        Some("yes") | Some("high") => IlRisk::High,
        // Unrecognized label: assume the worst rather than the best.
        Some(_) => IlRisk::High,
    };

    let tvl_usd = raw.tvl_usd.unwrap_or(0.0);
    let apy = raw.apy.unwrap_or(0.0);
    let assessment = RiskScorer::score(tvl_usd, apy, raw.stablecoin, il_risk, maturity);

    let apy_history: Vec<ApyPoint> = raw
        .apy_history
        .iter()
        .filter_map(|p| {
            p.apy.map(|apy| ApyPoint {
                timestamp: p.timestamp,
                apy,
            })
        })
        .collect();
    let apy_stability = StabilityAnalyzer::analyze(&apy_history, STABILITY_WINDOW_DAYS);

    let pool = Pool {
        id: raw.pool,
        chain: raw.chain.unwrap_or_else(|| "unknown".to_string()),
        protocol_slug,
        symbol: raw.symbol.unwrap_or_default(),
        tvl_usd: tvl_usd.max(0.0),
        apy: apy.max(0.0),
        apy_base: raw.apy_base.unwrap_or(0.0).max(0.0),
        apy_reward: raw.apy_reward.unwrap_or(0.0).max(0.0),
        stablecoin: raw.stablecoin,
        il_risk,
        underlying_assets: raw.underlying_tokens,
        risk_score: assessment.score,
        risk_level: assessment.level,
        risk_breakdown: assessment.breakdown,
        apy_stability,
        apy_history,
    };
    (pool, assessment.sanitized)
}
