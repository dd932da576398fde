use std::collections::HashMap;

use ndarray::{Array2, ArrayView1, Axis};

use super::RatingMatrix;
use crate::models::UserId;

/// Symmetric user x user cosine similarity matrix
///
/// Indexed by the same user ids, in the same order, as the rating matrix it
/// was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    values: Array2<f64>,
    user_ids: Vec<UserId>,
    user_index: HashMap<UserId, usize>,
}

impl SimilarityMatrix {
    /// Computes pairwise cosine similarity between every pair of users
    pub fn compute(matrix: &RatingMatrix) -> Self {
        Self::from_ratings(matrix.values(), matrix.user_ids())
    }

    /// Cosine similarity of the rows of `ratings`, labelled by `user_ids`
    ///
    /// Rows are scaled to unit length and multiplied by their own transpose in
    /// one batched product. A user whose row is all zeros has similarity `0.0`
    /// with everyone, including themselves. `user_ids` must label every row of
    /// `ratings`, in order.
    pub(crate) fn from_ratings(ratings: &Array2<f64>, user_ids: &[UserId]) -> Self {
        debug_assert_eq!(ratings.nrows(), user_ids.len());

        let norms = ratings.map_axis(Axis(1), |row| row.dot(&row).sqrt());
        let mut unit_rows = ratings.to_owned();
        for (mut row, norm) in unit_rows.axis_iter_mut(Axis(0)).zip(norms.iter()) {
            if *norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }

        let mut values = unit_rows.dot(&unit_rows.t());

        // The product is symmetric up to rounding; mirror the upper triangle
        // so lookups in either direction agree exactly.
        let users = values.nrows();
        for i in 0..users {
            values[[i, i]] = if norms[i] > 0.0 { 1.0 } else { 0.0 };
            for j in (i + 1)..users {
                values[[j, i]] = values[[i, j]];
            }
        }

        let user_ids = user_ids.to_vec();
        let user_index = user_ids
            .iter()
            .enumerate()
            .map(|(pos, id)| (*id, pos))
            .collect();

        tracing::debug!(users, "Similarity matrix computed");

        Self {
            values,
            user_ids,
            user_index,
        }
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn user_ids(&self) -> &[UserId] {
        &self.user_ids
    }

    pub fn user_position(&self, user_id: UserId) -> Option<usize> {
        self.user_index.get(&user_id).copied()
    }

    /// Similarity between two users; `None` if either is unknown
    pub fn get(&self, a: UserId, b: UserId) -> Option<f64> {
        let i = self.user_position(a)?;
        let j = self.user_position(b)?;
        Some(self.values[[i, j]])
    }

    /// Similarities of `user_id` to every user, in `user_ids()` order
    pub fn column(&self, user_id: UserId) -> Option<ArrayView1<'_, f64>> {
        self.user_position(user_id)
            .map(|pos| self.values.column(pos))
    }
}
