use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::{
    engine::SnapshotStats,
    error::{AppError, AppResult},
    models::{MovieId, UserId},
    services::{get_recommendations, RecommendationResponse},
};

use super::AppState;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct RecommendationQuery {
    pub user_id: UserId,
    pub n: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MovieDetailsResponse {
    pub movie_id: MovieId,
    pub title: String,
    pub genres: Vec<String>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u64>,
    pub tags: Vec<String>,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Top-N recommendations for one user
pub async fn recommendations(
    State(state): State<AppState>,
    query: Result<Query<RecommendationQuery>, QueryRejection>,
) -> AppResult<Json<RecommendationResponse>> {
    let Query(query) = query.map_err(|e| AppError::InvalidInput(e.body_text()))?;

    tracing::info!(user_id = query.user_id, n = ?query.n, "Processing recommendation request");

    let snapshot = state.current().await;
    let response = get_recommendations(
        &snapshot,
        query.user_id,
        query.n,
        state.recommendation_limits,
    )?;

    tracing::info!(
        user_id = query.user_id,
        snapshot_id = %response.snapshot_id,
        returned = response.recommendations.len(),
        "Recommendations generated"
    );

    Ok(Json(response))
}

/// Catalog entry for a movie, with its external ids and tags when loaded
pub async fn movie_details(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
) -> AppResult<Json<MovieDetailsResponse>> {
    let snapshot = state.current().await;
    let movie = snapshot
        .movie(movie_id)
        .ok_or_else(|| AppError::NotFound(format!("Movie {} is not in the catalog", movie_id)))?;
    let link = snapshot.link(movie_id);

    Ok(Json(MovieDetailsResponse {
        movie_id,
        title: movie.title.clone(),
        genres: movie.genre_list().into_iter().map(String::from).collect(),
        imdb_id: link.map(|l| l.imdb_id.clone()),
        tmdb_id: link.and_then(|l| l.tmdb_id),
        tags: snapshot
            .tags(movie_id)
            .iter()
            .map(|t| t.tag.clone())
            .collect(),
    }))
}

/// Summary of the snapshot currently serving requests
pub async fn stats(State(state): State<AppState>) -> Json<SnapshotStats> {
    Json(state.current().await.stats())
}

/// Reload the data source and swap in a freshly built snapshot
pub async fn rebuild(State(state): State<AppState>) -> AppResult<Json<SnapshotStats>> {
    let stats = state.rebuild().await?;
    Ok(Json(stats))
}
