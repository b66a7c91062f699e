//! Video platform capability
//!
//! Narrow interface to the third-party real-time-video provider:
//! session creation, per-user token issuance, recording control, and
//! the captioning feature. The core never retries platform calls;
//! retry policy belongs to the caller.

mod client;

pub use client::HttpVideoPlatform;

use crate::error::CoreResult;
use crate::role::Role;

/// Operations consumed from the video platform.
///
/// Implementations are free to fail with `Transient` (network or
/// platform-side trouble, safe to retry) or a permanent error such as
/// `InvalidArgument` / `NotFound`.
#[async_trait::async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Mint a new media session; returns its platform identifier.
    async fn create_session(&self) -> CoreResult<String>;

    /// Issue an access token for `session_id` scoped by `role`.
    async fn issue_token(&self, session_id: &str, role: Role) -> CoreResult<String>;

    /// Start recording the session; returns the recording identifier.
    async fn start_recording(&self, session_id: &str, room_name: &str) -> CoreResult<String>;

    /// Stop a running recording.
    async fn stop_recording(&self, recording_id: &str) -> CoreResult<String>;

    /// List recordings made for the session.
    async fn list_recordings(&self, session_id: &str) -> CoreResult<Vec<String>>;

    /// Turn on live captions for the session; returns the captions
    /// feature instance id.
    async fn enable_captions(&self, session_id: &str) -> CoreResult<String>;

    /// Turn off the captions feature instance; returns the platform's
    /// final status string.
    async fn disable_captions(&self, captions_id: &str) -> CoreResult<String>;
}
