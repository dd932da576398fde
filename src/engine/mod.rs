//! User-based collaborative filtering
//!
//! The engine is split into a build phase and a scoring phase. The build
//! phase pivots rating observations into a dense [`RatingMatrix`] and derives
//! a cosine [`SimilarityMatrix`] from it; both are immutable once built and
//! bundled into a [`ModelSnapshot`]. The scoring phase ([`recommend`]) is a
//! pure function of a snapshot's artifacts and the request, so any number of
//! requests can read the same snapshot at once.

use thiserror::Error;

use crate::models::UserId;

pub mod rating_matrix;
pub mod scorer;
pub mod similarity;
pub mod snapshot;

pub use rating_matrix::RatingMatrix;
pub use scorer::{peer_weights, recommend, Catalog};
pub use similarity::SimilarityMatrix;
pub use snapshot::{BuildLimits, ModelSnapshot, SnapshotStats};

/// Error types for the recommendation engine
///
/// All variants are deterministic input-shape failures. Retrying with the
/// same input produces the same error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("No ratings to build a rating matrix from")]
    EmptyInput,

    #[error("User {0} has no ratings")]
    UnknownUser(UserId),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("User {0} has zero similarity with every other user")]
    NoSimilarPeers(UserId),

    #[error("{users} users x {movies} movies exceeds the limit of {limit} matrix cells")]
    CapacityExceeded {
        users: usize,
        movies: usize,
        limit: usize,
    },
}

pub type EngineResult<T> = Result<T, EngineError>;
