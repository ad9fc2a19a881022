use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, params};
use tokio::sync::Mutex;

use super::CachedInsight;

/// Key-value store for insight cache records. Only whole-record operations —
/// a reader can never observe a half-written record.
#[async_trait]
pub trait InsightStore: Send + Sync {
    async fn get(&self, pool_id: &str) -> Result<Option<CachedInsight>>;
    async fn upsert(&self, entry: &CachedInsight) -> Result<()>;
    async fn delete(&self, pool_id: &str) -> Result<()>;
}

// ── Sqlite store ────────────────────────────────────────────────────

/// Durable store on sqlite. The record body is one JSON blob, so upsert and
/// delete are single-row, single-statement operations — atomic per record.
pub struct SqliteInsightStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteInsightStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("creating cache directory")?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("opening sqlite at {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        migrate(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS pool_insights (
            pool_id     TEXT PRIMARY KEY,
            record_json TEXT NOT NULL,
            expires_at  INTEGER NOT NULL
        );
        ",
    )?;
    Ok(())
}

#[async_trait]
impl InsightStore for SqliteInsightStore {
    async fn get(&self, pool_id: &str) -> Result<Option<CachedInsight>> {
        let conn = self.conn.lock().await;
        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM pool_insights WHERE pool_id = ?1",
                params![pool_id],
                |row| row.get(0),
            )
            .optional()
            .context("reading insight record")?;

        match json {
            Some(json) => Ok(Some(
                serde_json::from_str(&json).context("decoding insight record")?,
            )),
            None => Ok(None),
        }
    }

    async fn upsert(&self, entry: &CachedInsight) -> Result<()> {
        let json = serde_json::to_string(entry).context("encoding insight record")?;
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO pool_insights (pool_id, record_json, expires_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(pool_id) DO UPDATE
             SET record_json = excluded.record_json, expires_at = excluded.expires_at",
            params![entry.pool_id, json, entry.expires_at.timestamp()],
        )
        .context("writing insight record")?;
        Ok(())
    }

    async fn delete(&self, pool_id: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "DELETE FROM pool_insights WHERE pool_id = ?1",
            params![pool_id],
        )
        .context("deleting insight record")?;
        Ok(())
    }
}

// ── In-memory store ─────────────────────────────────────────────────

/// HashMap-backed store for tests and cache-less deployments.
#[derive(Default)]
pub struct MemoryInsightStore {
    entries: Mutex<HashMap<String, CachedInsight>>,
}

impl MemoryInsightStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InsightStore for MemoryInsightStore {
    async fn get(&self, pool_id: &str) -> Result<Option<CachedInsight>> {
        Ok(self.entries.lock().await.get(pool_id).cloned())
    }

    async fn upsert(&self, entry: &CachedInsight) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(entry.pool_id.clone(), entry.clone());
        Ok(())
    }

    async fn delete(&self, pool_id: &str) -> Result<()> {
        self.entries.lock().await.remove(pool_id);
        Ok(())
    }
}
