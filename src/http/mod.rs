//! HTTP API server for room and captions control
//!
//! This module provides a REST API for the backend:
//! - POST /rooms/:room/join - Resolve the room's session and issue a token
//! - POST /rooms/:room/captions/join - Register a captions participant
//! - POST /rooms/:room/captions/leave - Unregister a captions participant
//! - POST /rooms/:room/recordings/start - Start a recording
//! - POST /recordings/:id/stop - Stop a recording
//! - GET /rooms/:room/recordings - List the room's recordings
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
