use std::collections::HashMap;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{
    recommend, Catalog, EngineError, EngineResult, RatingMatrix, SimilarityMatrix,
};
use crate::models::{Dataset, Link, Movie, MovieId, Recommendation, Tag, UserId};

/// Limits applied while building a snapshot
#[derive(Debug, Clone, Copy)]
pub struct BuildLimits {
    /// Upper bound on the cells of both the users x movies rating matrix and
    /// the users x users similarity matrix
    pub max_matrix_cells: usize,
}

impl BuildLimits {
    /// Rejects a build whose rating or similarity matrix would exceed the cap
    pub fn check(&self, users: usize, movies: usize) -> EngineResult<()> {
        let rating_cells = users.saturating_mul(movies);
        let similarity_cells = users.saturating_mul(users);
        if rating_cells.max(similarity_cells) > self.max_matrix_cells {
            return Err(EngineError::CapacityExceeded {
                users,
                movies,
                limit: self.max_matrix_cells,
            });
        }
        Ok(())
    }
}

impl Default for BuildLimits {
    fn default() -> Self {
        Self {
            max_matrix_cells: 50_000_000,
        }
    }
}

/// Summary of a built snapshot
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SnapshotStats {
    pub snapshot_id: Uuid,
    pub built_at: DateTime<Utc>,
    pub users: usize,
    pub movies: usize,
    pub ratings: usize,
    pub catalog_entries: usize,
}

/// Immutable bundle of everything a recommendation request reads
///
/// Built once per batch of ratings and never mutated afterwards. Replacing
/// the data means building a new snapshot and swapping it in.
#[derive(Debug)]
pub struct ModelSnapshot {
    id: Uuid,
    built_at: DateTime<Utc>,
    matrix: RatingMatrix,
    similarity: SimilarityMatrix,
    catalog: Catalog,
    movies: HashMap<MovieId, Movie>,
    links: HashMap<MovieId, Link>,
    tags: HashMap<MovieId, Vec<Tag>>,
}

impl ModelSnapshot {
    /// Runs the build phase: rating matrix, then similarity matrix
    ///
    /// CPU-bound; callers on an async runtime should run it on a blocking
    /// thread.
    pub fn build(dataset: Dataset, limits: BuildLimits) -> EngineResult<Self> {
        let start = Instant::now();

        let (user_ids, movie_ids) = RatingMatrix::distinct_ids(&dataset.ratings);
        limits.check(user_ids.len(), movie_ids.len())?;

        let matrix = RatingMatrix::build(&dataset.ratings)?;
        let similarity = SimilarityMatrix::compute(&matrix);
        let catalog = Catalog::from_movies(&dataset.movies);

        let links = dataset
            .links
            .unwrap_or_default()
            .into_iter()
            .map(|link| (link.movie_id, link))
            .collect();

        let mut tags: HashMap<MovieId, Vec<Tag>> = HashMap::new();
        for tag in dataset.tags.unwrap_or_default() {
            tags.entry(tag.movie_id).or_default().push(tag);
        }

        let movies = dataset
            .movies
            .into_iter()
            .map(|movie| (movie.movie_id, movie))
            .collect();

        let snapshot = Self {
            id: Uuid::new_v4(),
            built_at: Utc::now(),
            matrix,
            similarity,
            catalog,
            movies,
            links,
            tags,
        };

        let (users, movies) = snapshot.matrix.shape();
        tracing::info!(
            snapshot_id = %snapshot.id,
            users,
            movies,
            ratings = snapshot.matrix.rated_count(),
            catalog_entries = snapshot.catalog.len(),
            elapsed_ms = start.elapsed().as_millis(),
            "Model snapshot built"
        );

        Ok(snapshot)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn matrix(&self) -> &RatingMatrix {
        &self.matrix
    }

    pub fn similarity(&self) -> &SimilarityMatrix {
        &self.similarity
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn movie(&self, movie_id: MovieId) -> Option<&Movie> {
        self.movies.get(&movie_id)
    }

    pub fn link(&self, movie_id: MovieId) -> Option<&Link> {
        self.links.get(&movie_id)
    }

    pub fn tags(&self, movie_id: MovieId) -> &[Tag] {
        self.tags.get(&movie_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Scores `n` recommendations for `user_id` against this snapshot
    pub fn recommend(&self, user_id: UserId, n: usize) -> EngineResult<Vec<Recommendation>> {
        recommend(user_id, &self.matrix, &self.similarity, &self.catalog, n)
    }

    pub fn stats(&self) -> SnapshotStats {
        let (users, movies) = self.matrix.shape();
        SnapshotStats {
            snapshot_id: self.id,
            built_at: self.built_at,
            users,
            movies,
            ratings: self.matrix.rated_count(),
            catalog_entries: self.catalog.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Rating;

    fn dataset() -> Dataset {
        Dataset {
            ratings: vec![
                Rating::new(1, 10, 5.0),
                Rating::new(1, 20, 3.0),
                Rating::new(2, 10, 4.0),
                Rating::new(2, 20, 4.0),
                Rating::new(2, 30, 5.0),
            ],
            movies: vec![Movie::new(10, "A"), Movie::new(20, "B"), Movie::new(30, "C")],
            links: Some(vec![Link {
                movie_id: 30,
                imdb_id: "0114709".to_string(),
                tmdb_id: Some(862),
            }]),
            tags: Some(vec![
                Tag {
                    user_id: 2,
                    movie_id: 30,
                    tag: "pixar".to_string(),
                },
                Tag {
                    user_id: 1,
                    movie_id: 30,
                    tag: "fun".to_string(),
                },
            ]),
        }
    }

    #[test]
    fn test_build_and_recommend() {
        let snapshot = ModelSnapshot::build(dataset(), BuildLimits::default()).unwrap();
        let recs = snapshot.recommend(1, 5).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].movie_id, 30);
        assert_eq!(recs[0].title, "C");
    }

    #[test]
    fn test_stats() {
        let snapshot = ModelSnapshot::build(dataset(), BuildLimits::default()).unwrap();
        let stats = snapshot.stats();
        assert_eq!(stats.snapshot_id, snapshot.id());
        assert_eq!(stats.users, 2);
        assert_eq!(stats.movies, 3);
        assert_eq!(stats.ratings, 5);
        assert_eq!(stats.catalog_entries, 3);
    }

    #[test]
    fn test_pass_through_tables() {
        let snapshot = ModelSnapshot::build(dataset(), BuildLimits::default()).unwrap();
        assert_eq!(snapshot.link(30).unwrap().tmdb_id, Some(862));
        assert!(snapshot.link(10).is_none());
        assert_eq!(snapshot.tags(30).len(), 2);
        assert!(snapshot.tags(10).is_empty());
        assert_eq!(snapshot.movie(20).unwrap().title, "B");
    }

    #[test]
    fn test_each_build_gets_a_fresh_id() {
        let a = ModelSnapshot::build(dataset(), BuildLimits::default()).unwrap();
        let b = ModelSnapshot::build(dataset(), BuildLimits::default()).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_capacity_limit() {
        let limits = BuildLimits {
            max_matrix_cells: 5,
        };
        let err = ModelSnapshot::build(dataset(), limits).unwrap_err();
        assert_eq!(
            err,
            EngineError::CapacityExceeded {
                users: 2,
                movies: 3,
                limit: 5
            }
        );
    }

    #[test]
    fn test_capacity_limit_counts_similarity_cells() {
        // 100 users x 1 movie fits the rating matrix, but the similarity
        // matrix would hold 100 x 100 cells.
        let dataset = Dataset {
            ratings: (1..=100).map(|user| Rating::new(user, 1, 3.0)).collect(),
            movies: vec![Movie::new(1, "A")],
            ..Dataset::default()
        };
        let limits = BuildLimits {
            max_matrix_cells: 100,
        };
        let err = ModelSnapshot::build(dataset, limits).unwrap_err();
        assert_eq!(
            err,
            EngineError::CapacityExceeded {
                users: 100,
                movies: 1,
                limit: 100
            }
        );
    }

    #[test]
    fn test_limits_accept_builds_at_the_cap() {
        let limits = BuildLimits {
            max_matrix_cells: 100,
        };
        assert!(limits.check(10, 10).is_ok());
        assert!(limits.check(10, 11).is_err());
        assert!(limits.check(11, 1).is_err());
        assert!(limits.check(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_empty_ratings() {
        let err = ModelSnapshot::build(Dataset::default(), BuildLimits::default()).unwrap_err();
        assert_eq!(err, EngineError::EmptyInput);
    }
}
