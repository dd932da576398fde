use std::time::Instant;

use crate::{
    engine::{BuildLimits, ModelSnapshot},
    error::{AppError, AppResult},
    services::sources::DataSource,
};

/// Loads a fresh dataset and builds a new snapshot from it
///
/// The build runs on tokio's blocking pool since the similarity computation
/// is CPU-bound. Nothing shared is touched; the caller decides when to swap
/// the result in.
pub async fn build_snapshot(
    source: &dyn DataSource,
    limits: BuildLimits,
) -> AppResult<ModelSnapshot> {
    let start = Instant::now();
    tracing::info!(source = %source.describe(), "Loading dataset");

    let dataset = source.load().await?;

    let snapshot = tokio::task::spawn_blocking(move || ModelSnapshot::build(dataset, limits))
        .await
        .map_err(|e| AppError::Internal(format!("Snapshot build task failed: {}", e)))??;

    tracing::info!(
        snapshot_id = %snapshot.id(),
        elapsed_ms = start.elapsed().as_millis(),
        "Snapshot ready"
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::models::{Dataset, Movie, Rating};
    use crate::services::sources::MockDataSource;

    fn mock_source(dataset: Dataset) -> MockDataSource {
        let mut source = MockDataSource::new();
        source
            .expect_describe()
            .return_const("mock".to_string());
        source
            .expect_load()
            .times(1)
            .returning(move || Ok(dataset.clone()));
        source
    }

    #[tokio::test]
    async fn test_build_snapshot_from_source() {
        let source = mock_source(Dataset {
            ratings: vec![Rating::new(1, 10, 4.0), Rating::new(2, 10, 3.0), Rating::new(2, 20, 5.0)],
            movies: vec![Movie::new(10, "A"), Movie::new(20, "B")],
            ..Dataset::default()
        });

        let snapshot = build_snapshot(&source, BuildLimits::default()).await.unwrap();
        assert_eq!(snapshot.stats().users, 2);
        assert_eq!(snapshot.recommend(1, 5).unwrap()[0].movie_id, 20);
    }

    #[tokio::test]
    async fn test_empty_dataset_is_engine_error() {
        let source = mock_source(Dataset::default());
        let err = build_snapshot(&source, BuildLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_load_failure_propagates() {
        let mut source = MockDataSource::new();
        source
            .expect_describe()
            .return_const("broken".to_string());
        source
            .expect_load()
            .returning(|| Err(AppError::ExternalApi("ratings.csv returned 503".to_string())));

        let err = build_snapshot(&source, BuildLimits::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
    }
}
