//! Movie recommendations by user-based collaborative filtering
//!
//! Ratings are pivoted into a user x movie matrix, users are compared by
//! cosine similarity, and a user's unseen movies are scored by the
//! similarity-weighted ratings of everyone else. The [`engine`] holds the
//! numerical core; [`services`] and [`api`] load data and serve results over
//! HTTP.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
