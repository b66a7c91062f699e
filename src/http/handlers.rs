use super::state::AppState;
use crate::captions::CaptionsStatus;
use crate::error::CoreError;
use crate::role::{ensure_admin, Role};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct JoinRoomRequest {
    /// Caller role, pre-validated upstream
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct JoinRoomResponse {
    pub room: String,
    pub session_id: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptionsJoinRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct CaptionsJoinResponse {
    pub room: String,
    pub captions_id: String,
}

#[derive(Debug, Deserialize)]
pub struct CaptionsLeaveRequest {
    pub captions_id: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct CaptionsLeaveResponse {
    pub room: String,
    #[serde(flatten)]
    pub outcome: CaptionsStatus,
}

#[derive(Debug, Deserialize)]
pub struct RecordingRequest {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct RecordingResponse {
    pub recording_id: String,
}

#[derive(Debug, Serialize)]
pub struct RecordingListResponse {
    pub room: String,
    pub recordings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn core_error(e: CoreError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        CoreError::NotFound(_) => StatusCode::NOT_FOUND,
        CoreError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        CoreError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        CoreError::Transient(_) => StatusCode::SERVICE_UNAVAILABLE,
    };

    error!("Request failed: {}", e);
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /rooms/:room/join
/// Resolve the room to its session and issue an access token
pub async fn join_room(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(req): Json<JoinRoomRequest>,
) -> impl IntoResponse {
    info!("Join request for room '{}' as {}", room, req.role);

    let session_id = match state.resolver.resolve(&room).await {
        Ok(id) => id,
        Err(e) => return core_error(e).into_response(),
    };

    let token = match state.platform.issue_token(&session_id, req.role).await {
        Ok(token) => token,
        Err(e) => return core_error(e).into_response(),
    };

    (
        StatusCode::OK,
        Json(JoinRoomResponse {
            room,
            session_id,
            token,
        }),
    )
        .into_response()
}

/// POST /rooms/:room/captions/join
/// Register one more participant wanting captions
pub async fn captions_join(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(req): Json<CaptionsJoinRequest>,
) -> impl IntoResponse {
    info!("Captions join for room '{}' as {}", room, req.role);

    match state.captions.join(&room, req.role).await {
        Ok(captions_id) => (
            StatusCode::OK,
            Json(CaptionsJoinResponse { room, captions_id }),
        )
            .into_response(),
        Err(e) => core_error(e).into_response(),
    }
}

/// POST /rooms/:room/captions/leave
/// Unregister one participant; disables captions on the last leave
pub async fn captions_leave(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(req): Json<CaptionsLeaveRequest>,
) -> impl IntoResponse {
    info!("Captions leave for room '{}' as {}", room, req.role);

    match state
        .captions
        .leave(&room, &req.captions_id, req.role)
        .await
    {
        Ok(outcome) => (
            StatusCode::OK,
            Json(CaptionsLeaveResponse { room, outcome }),
        )
            .into_response(),
        Err(e) => core_error(e).into_response(),
    }
}

/// POST /rooms/:room/recordings/start
/// Start a platform recording for the room (admin only)
pub async fn start_recording(
    State(state): State<AppState>,
    Path(room): Path<String>,
    Json(req): Json<RecordingRequest>,
) -> impl IntoResponse {
    if let Err(e) = ensure_admin(req.role, "start recordings") {
        return core_error(e).into_response();
    }

    info!("Starting recording for room '{}'", room);

    let session_id = match state.resolver.resolve(&room).await {
        Ok(id) => id,
        Err(e) => return core_error(e).into_response(),
    };

    match state.platform.start_recording(&session_id, &room).await {
        Ok(recording_id) => (StatusCode::OK, Json(RecordingResponse { recording_id })).into_response(),
        Err(e) => core_error(e).into_response(),
    }
}

/// POST /recordings/:recording_id/stop
/// Stop a running recording (admin only)
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<String>,
    Json(req): Json<RecordingRequest>,
) -> impl IntoResponse {
    if let Err(e) = ensure_admin(req.role, "stop recordings") {
        return core_error(e).into_response();
    }

    info!("Stopping recording {}", recording_id);

    match state.platform.stop_recording(&recording_id).await {
        Ok(recording_id) => (StatusCode::OK, Json(RecordingResponse { recording_id })).into_response(),
        Err(e) => core_error(e).into_response(),
    }
}

/// GET /rooms/:room/recordings
/// List recordings made for the room's session
pub async fn list_recordings(
    State(state): State<AppState>,
    Path(room): Path<String>,
) -> impl IntoResponse {
    let session_id = match state.store.get(&room).await {
        Ok(Some(s)) => match s.session_id {
            Some(id) => id,
            None => {
                return core_error(CoreError::NotFound(format!("room '{}' has no session", room)))
                    .into_response()
            }
        },
        Ok(None) => {
            return core_error(CoreError::NotFound(format!("room '{}'", room))).into_response()
        }
        Err(e) => return core_error(e).into_response(),
    };

    match state.platform.list_recordings(&session_id).await {
        Ok(recordings) => (
            StatusCode::OK,
            Json(RecordingListResponse { room, recordings }),
        )
            .into_response(),
        Err(e) => core_error(e).into_response(),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
