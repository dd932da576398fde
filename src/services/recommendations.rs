use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::Config,
    engine::ModelSnapshot,
    error::{AppError, AppResult},
    models::{Recommendation, UserId},
};

/// Bounds on how many recommendations one request may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationLimits {
    pub default_count: usize,
    pub max_count: usize,
}

impl Default for RecommendationLimits {
    fn default() -> Self {
        Self {
            default_count: 5,
            max_count: 20,
        }
    }
}

impl From<&Config> for RecommendationLimits {
    fn from(config: &Config) -> Self {
        Self {
            default_count: config.default_recommendations,
            max_count: config.max_recommendations,
        }
    }
}

/// Ranked recommendations for one user, tagged with the snapshot that
/// produced them
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationResponse {
    pub user_id: UserId,
    pub snapshot_id: Uuid,
    pub recommendations: Vec<Recommendation>,
}

/// Generates personalized movie recommendations
///
/// `count` falls back to the configured default and must lie within
/// `1..=max_count`. The snapshot is only read.
pub fn get_recommendations(
    snapshot: &ModelSnapshot,
    user_id: UserId,
    count: Option<usize>,
    limits: RecommendationLimits,
) -> AppResult<RecommendationResponse> {
    let n = count.unwrap_or(limits.default_count);
    if !(1..=limits.max_count).contains(&n) {
        return Err(AppError::InvalidInput(format!(
            "n must be between 1 and {}, got {}",
            limits.max_count, n
        )));
    }

    let recommendations = snapshot.recommend(user_id, n)?;

    Ok(RecommendationResponse {
        user_id,
        snapshot_id: snapshot.id(),
        recommendations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{BuildLimits, EngineError};
    use crate::models::{Dataset, Movie, Rating};

    fn snapshot() -> ModelSnapshot {
        let dataset = Dataset {
            ratings: vec![
                Rating::new(1, 10, 5.0),
                Rating::new(1, 20, 3.0),
                Rating::new(2, 10, 4.0),
                Rating::new(2, 20, 4.0),
                Rating::new(2, 30, 5.0),
            ],
            movies: vec![Movie::new(10, "A"), Movie::new(20, "B"), Movie::new(30, "C")],
            ..Dataset::default()
        };
        ModelSnapshot::build(dataset, BuildLimits::default()).unwrap()
    }

    #[test]
    fn test_default_count_applies() {
        let snapshot = snapshot();
        let response =
            get_recommendations(&snapshot, 1, None, RecommendationLimits::default()).unwrap();
        assert_eq!(response.user_id, 1);
        assert_eq!(response.snapshot_id, snapshot.id());
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].title, "C");
    }

    #[test]
    fn test_count_out_of_range() {
        let snapshot = snapshot();
        let limits = RecommendationLimits::default();
        for n in [0, 21] {
            let err = get_recommendations(&snapshot, 1, Some(n), limits).unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)));
        }
    }

    #[test]
    fn test_unknown_user_propagates() {
        let snapshot = snapshot();
        let err = get_recommendations(&snapshot, 77, Some(3), RecommendationLimits::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Engine(EngineError::UnknownUser(77))));
    }
}
