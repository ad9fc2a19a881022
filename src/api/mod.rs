pub mod error;
pub mod handlers;
pub mod state;
pub mod types;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};

use crate::ingest::{self, SnapshotSource};
use crate::insight::{HttpInsightGenerator, InsightCache, SqliteInsightStore};
use crate::model::SnapshotStore;

use state::AppState;

pub async fn serve(host: &str, port: u16, source: SnapshotSource, data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;

    let store = SqliteInsightStore::open(&data_dir.join("insights.db"))
        .context("opening insight cache store")?;

    let ai_api_key = std::env::var("YIELDSCOPE_AI_API_KEY").unwrap_or_default();
    let ai_base_url = std::env::var("YIELDSCOPE_AI_BASE_URL")
        .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());
    let ai_model =
        std::env::var("YIELDSCOPE_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

    if ai_api_key.is_empty() {
        println!("  Warning: YIELDSCOPE_AI_API_KEY not set — pool insights will return 503");
    }

    let generator = HttpInsightGenerator::new(ai_base_url, ai_api_key, ai_model)
        .context("building insight generator")?;
    let insights = InsightCache::new(Arc::new(store), Arc::new(generator));

    let snapshots = SnapshotStore::new();
    match ingest::load(&source).await {
        Ok(snapshot) => {
            println!(
                "Loaded snapshot v{}: {} protocols, {} pools, {} warning(s)",
                snapshot.metadata.version,
                snapshot.metadata.protocol_count,
                snapshot.metadata.pool_count,
                snapshot.metadata.warnings.len()
            );
            snapshots.swap(snapshot);
        }
        // Bootstrap without a snapshot is expected; endpoints degrade to
        // empty results until the first successful refresh.
        Err(e) => eprintln!("Warning: initial snapshot load failed: {e:#}"),
    }

    let app = router(AppState::new(snapshots, insights, source));

    let addr = format!("{host}:{port}");
    println!("yieldscope API server listening on {addr}");
    println!("  Health:    GET  http://{addr}/health");
    println!("  Pools:     GET  http://{addr}/api/pools");
    println!("  Protocols: GET  http://{addr}/api/protocols");
    println!("  Spreads:   GET  http://{addr}/api/spreads");
    println!("  Graph:     GET  http://{addr}/api/graph");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    axum::serve(listener, app).await.context("running server")?;

    Ok(())
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/pools", get(handlers::pools::list_pools))
        .route("/api/pools/{id}", get(handlers::pools::get_pool))
        .route("/api/pools/{id}/insight", get(handlers::insights::pool_insight))
        .route("/api/protocols", get(handlers::protocols::list_protocols))
        .route("/api/protocols/{slug}", get(handlers::protocols::get_protocol))
        .route("/api/spreads", get(handlers::spreads::list_spreads))
        .route("/api/graph", get(handlers::graph::get_graph))
        .route("/api/snapshot", get(handlers::snapshot::status))
        .route("/api/snapshot/refresh", post(handlers::snapshot::refresh))
        .route("/api/schema", get(handlers::schema::get_schema))
        .layer(cors)
        .with_state(state)
}
