use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Buttons
        .route("/controls", get(handlers::get_controls))
        .route("/controls/record", post(handlers::toggle_recording))
        .route("/controls/prerecorded", post(handlers::play_prerecorded))
        .route("/controls/recordings/:number", post(handlers::play_recorded))
        // Queries
        .route("/recordings", get(handlers::list_recordings))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
