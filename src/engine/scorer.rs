use std::collections::HashMap;

use ndarray::Array1;

use super::{EngineError, EngineResult, RatingMatrix, SimilarityMatrix};
use crate::models::{Movie, MovieId, Recommendation, UserId};

/// Read-only movie id -> title lookup used to decorate recommendations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    titles: HashMap<MovieId, String>,
}

impl Catalog {
    pub fn from_movies(movies: &[Movie]) -> Self {
        movies
            .iter()
            .map(|m| (m.movie_id, m.title.clone()))
            .collect()
    }

    pub fn title(&self, movie_id: MovieId) -> Option<&str> {
        self.titles.get(&movie_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl FromIterator<(MovieId, String)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (MovieId, String)>>(iter: I) -> Self {
        Self {
            titles: iter.into_iter().collect(),
        }
    }
}

/// Normalized similarity weight of every peer of `target_user`
///
/// The target's own entry is excluded and the remaining similarities are
/// divided by their sum, so the returned weights add up to 1.0. Peers are in
/// the similarity matrix's user order.
pub fn peer_weights(
    target_user: UserId,
    similarity: &SimilarityMatrix,
) -> EngineResult<Vec<(UserId, f64)>> {
    let column = similarity
        .column(target_user)
        .ok_or(EngineError::UnknownUser(target_user))?;

    let peers: Vec<(UserId, f64)> = similarity
        .user_ids()
        .iter()
        .zip(column.iter())
        .filter(|(user_id, _)| **user_id != target_user)
        .map(|(user_id, sim)| (*user_id, *sim))
        .collect();

    let total: f64 = peers.iter().map(|(_, sim)| sim).sum();
    if total == 0.0 || !total.is_finite() {
        return Err(EngineError::NoSimilarPeers(target_user));
    }

    Ok(peers
        .into_iter()
        .map(|(user_id, sim)| (user_id, sim / total))
        .collect())
}

/// Top-`n` movies `target_user` has not rated, ranked by predicted rating
///
/// A movie's predicted rating is the weighted sum of every peer's rating for
/// it, using [`peer_weights`]. Unrated peer cells count as `0.0`. Movies
/// missing from the catalog are dropped. Ties are broken by ascending movie
/// id. Fewer than `n` rows come back when fewer candidates exist.
///
/// # Errors
/// * `InvalidArgument` if `n` is zero or the two matrices are not indexed by
///   the same users
/// * `UnknownUser` if `target_user` has no row
/// * `NoSimilarPeers` if the target shares no similarity with any peer
pub fn recommend(
    target_user: UserId,
    matrix: &RatingMatrix,
    similarity: &SimilarityMatrix,
    catalog: &Catalog,
    n: usize,
) -> EngineResult<Vec<Recommendation>> {
    if n == 0 {
        return Err(EngineError::InvalidArgument(
            "number of recommendations must be at least 1".to_string(),
        ));
    }
    if matrix.user_ids() != similarity.user_ids() {
        return Err(EngineError::InvalidArgument(
            "similarity matrix was not computed from this rating matrix".to_string(),
        ));
    }

    let target_row = matrix
        .user_row(target_user)
        .ok_or(EngineError::UnknownUser(target_user))?;

    let mut weights = Array1::<f64>::zeros(matrix.user_ids().len());
    for (peer, weight) in peer_weights(target_user, similarity)? {
        if let Some(pos) = matrix.user_position(peer) {
            weights[pos] = weight;
        }
    }

    // The target's own weight is zero, so its row drops out of the product.
    let predicted = matrix.values().t().dot(&weights);

    let mut dropped = 0usize;
    let mut recommendations: Vec<Recommendation> = matrix
        .movie_ids()
        .iter()
        .enumerate()
        .filter(|(col, _)| target_row[*col] == 0.0)
        .filter_map(|(col, movie_id)| match catalog.title(*movie_id) {
            Some(title) => Some(Recommendation {
                movie_id: *movie_id,
                predicted_rating: predicted[col],
                title: title.to_string(),
            }),
            None => {
                dropped += 1;
                tracing::debug!(movie_id, "Candidate missing from catalog, dropping");
                None
            }
        })
        .collect();

    recommendations.sort_by(|a, b| {
        b.predicted_rating
            .total_cmp(&a.predicted_rating)
            .then(a.movie_id.cmp(&b.movie_id))
    });
    let candidates = recommendations.len();
    recommendations.truncate(n);

    tracing::debug!(
        user_id = target_user,
        n,
        candidates,
        dropped,
        returned = recommendations.len(),
        "Recommendations scored"
    );

    Ok(recommendations)
}
