use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Recommendations
        .route("/recommendations", get(handlers::recommendations))
        // Catalog
        .route("/movies/:movie_id", get(handlers::movie_details))
        // Snapshot management
        .route("/stats", get(handlers::stats))
        .route("/admin/rebuild", post(handlers::rebuild))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
