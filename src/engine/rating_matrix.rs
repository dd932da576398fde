use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use ndarray::{Array2, ArrayView1};

use super::{EngineError, EngineResult};
use crate::models::{MovieId, Rating, UserId};

/// Dense user x movie rating matrix
///
/// Rows are users and columns are movies, both in ascending id order. A cell
/// holds the rating the user gave the movie, or `0.0` when the user has not
/// rated it. Ratings are strictly positive, so `0.0` never means "rated zero".
#[derive(Debug, Clone, PartialEq)]
pub struct RatingMatrix {
    values: Array2<f64>,
    user_ids: Vec<UserId>,
    movie_ids: Vec<MovieId>,
    user_index: HashMap<UserId, usize>,
    movie_index: HashMap<MovieId, usize>,
}

impl RatingMatrix {
    /// Pivots rating observations into a dense matrix
    ///
    /// When the same (user, movie) pair appears more than once, the last
    /// observation in input order wins.
    pub fn build(ratings: &[Rating]) -> EngineResult<Self> {
        if ratings.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        if let Some(bad) = ratings
            .iter()
            .find(|r| !r.rating.is_finite() || r.rating <= 0.0)
        {
            return Err(EngineError::InvalidArgument(format!(
                "rating {} by user {} for movie {} must be a positive number",
                bad.rating, bad.user_id, bad.movie_id
            )));
        }

        let (user_ids, movie_ids) = Self::distinct_ids(ratings);
        let user_index = index_of(&user_ids);
        let movie_index = index_of(&movie_ids);

        let mut values = Array2::<f64>::zeros((user_ids.len(), movie_ids.len()));
        for rating in ratings {
            let row = user_index[&rating.user_id];
            let col = movie_index[&rating.movie_id];
            values[[row, col]] = rating.rating;
        }

        tracing::debug!(
            observations = ratings.len(),
            users = user_ids.len(),
            movies = movie_ids.len(),
            "Rating matrix built"
        );

        Ok(Self {
            values,
            user_ids,
            movie_ids,
            user_index,
            movie_index,
        })
    }

    /// Distinct user ids and movie ids, each sorted ascending
    pub fn distinct_ids(ratings: &[Rating]) -> (Vec<UserId>, Vec<MovieId>) {
        let users: BTreeSet<UserId> = ratings.iter().map(|r| r.user_id).collect();
        let movies: BTreeSet<MovieId> = ratings.iter().map(|r| r.movie_id).collect();
        (users.into_iter().collect(), movies.into_iter().collect())
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        self.values.dim()
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn movie_ids(&self) -> &[MovieId] {
        &self.movie_ids
    }

    pub fn user_position(&self, user_id: UserId) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    pub fn movie_position(&self, movie_id: MovieId) -> Option<usize> {
        self.movie_index.get(&movie_id).copied()
    }

    pub fn contains_user(&self, user_id: UserId) -> bool {
        self.user_index.contains_key(&user_id)
    }

    /// The user's full rating row, or `None` for an unknown user
    pub fn user_row(&self, user_id: UserId) -> Option<ArrayView1<'_, f64>> {
        self.user_position(user_id).map(|row| self.values.row(row))
    }

    /// Rating cell, `0.0` when unrated; `None` if either id is unknown
    pub fn get(&self, user_id: UserId, movie_id: MovieId) -> Option<f64> {
        let row = self.user_position(user_id)?;
        let col = self.movie_position(movie_id)?;
        Some(self.values[[row, col]])
    }

    /// Number of non-zero cells
    pub fn rated_count(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }
}

/// Id -> position lookup for a list of distinct ids
fn index_of<Id: Copy + Eq + Hash>(ids: &[Id]) -> HashMap<Id, usize> {
    ids.iter().enumerate().map(|(pos, id)| (*id, pos)).collect()
}
