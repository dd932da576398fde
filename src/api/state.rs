use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    config::Config,
    engine::{BuildLimits, ModelSnapshot, SnapshotStats},
    error::AppResult,
    services::{build_snapshot, DataSource, RecommendationLimits},
};

/// Shared application state
///
/// The current snapshot sits behind a lock only long enough to clone or
/// replace the `Arc`. Requests score against the `Arc` they cloned, so a
/// rebuild never changes the data under a request that is already running.
#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<RwLock<Arc<ModelSnapshot>>>,
    source: Arc<dyn DataSource>,
    /// Held for the whole of a rebuild so two rebuilds never overlap
    rebuild_guard: Arc<Mutex<()>>,
    pub build_limits: BuildLimits,
    pub recommendation_limits: RecommendationLimits,
}

impl AppState {
    /// Creates state around an already-built snapshot
    pub fn new(snapshot: ModelSnapshot, source: Arc<dyn DataSource>, config: &Config) -> Self {
        Self {
            snapshot: Arc::new(RwLock::new(Arc::new(snapshot))),
            source,
            rebuild_guard: Arc::new(Mutex::new(())),
            build_limits: config.build_limits(),
            recommendation_limits: RecommendationLimits::from(config),
        }
    }

    /// The snapshot requests should read right now
    pub async fn current(&self) -> Arc<ModelSnapshot> {
        Arc::clone(&*self.snapshot.read().await)
    }

    /// Swaps in a new snapshot, returning the one it replaced
    pub async fn replace(&self, snapshot: ModelSnapshot) -> Arc<ModelSnapshot> {
        let mut current = self.snapshot.write().await;
        std::mem::replace(&mut *current, Arc::new(snapshot))
    }

    /// Reloads the data source, builds a new snapshot and swaps it in
    ///
    /// On failure the current snapshot stays in place.
    pub async fn rebuild(&self) -> AppResult<SnapshotStats> {
        let _guard = self.rebuild_guard.lock().await;

        let snapshot = build_snapshot(self.source.as_ref(), self.build_limits).await?;
        let stats = snapshot.stats();
        let previous = self.replace(snapshot).await;

        tracing::info!(
            previous_snapshot = %previous.id(),
            snapshot_id = %stats.snapshot_id,
            "Snapshot swapped"
        );

        Ok(stats)
    }
}
