use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Room access
        .route("/rooms/:room/join", post(handlers::join_room))
        // Captions consistency
        .route("/rooms/:room/captions/join", post(handlers::captions_join))
        .route(
            "/rooms/:room/captions/leave",
            post(handlers::captions_leave),
        )
        // Recording control
        .route(
            "/rooms/:room/recordings/start",
            post(handlers::start_recording),
        )
        .route("/rooms/:room/recordings", get(handlers::list_recordings))
        .route(
            "/recordings/:recording_id/stop",
            post(handlers::stop_recording),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
