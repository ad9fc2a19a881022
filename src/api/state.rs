use std::sync::Arc;

use crate::ingest::SnapshotSource;
use crate::insight::InsightCache;
use crate::model::SnapshotStore;

#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<AppStateInner>,
}

pub struct AppStateInner {
    /// Current snapshot behind an atomically swappable reference.
    pub snapshots: SnapshotStore,
    pub insights: InsightCache,
    /// Where `POST /api/snapshot/refresh` re-loads from.
    pub source: SnapshotSource,
}

impl AppState {
    pub fn new(snapshots: SnapshotStore, insights: InsightCache, source: SnapshotSource) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                snapshots,
                insights,
                source,
            }),
        }
    }
}
