use crate::broadcast::{CaptionsSignal, SignalBroadcast};
use crate::error::{CoreError, CoreResult};
use crate::platform::VideoPlatform;
use crate::role::{ensure_admin, Role};
use crate::store::{RoomPatch, RoomStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome of a captions leave.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum CaptionsStatus {
    /// This leave was the 1->0 edge; the platform feature was disabled.
    Disabled,

    /// Captions were already off (or the id was already cleared by a
    /// concurrent disable); the leave resolved as a no-op.
    AlreadyDisabled,

    /// Other participants still want captions; nothing was disabled.
    StillActive { remaining: u64 },
}

/// Server-side captions reference counting.
///
/// Tracks how many participants of a room currently want captions and
/// drives the expensive platform enable/disable calls exactly at the
/// 0->1 and 1->0 transitions, broadcasting the outcome to the room.
/// The count mutation always stands, even when the platform call after
/// it fails: the count reflects desire, not platform success, and the
/// caller retries the edge.
pub struct CaptionsCoordinator {
    store: Arc<dyn RoomStore>,
    platform: Arc<dyn VideoPlatform>,
    broadcast: Arc<dyn SignalBroadcast>,
}

impl CaptionsCoordinator {
    pub fn new(
        store: Arc<dyn RoomStore>,
        platform: Arc<dyn VideoPlatform>,
        broadcast: Arc<dyn SignalBroadcast>,
    ) -> Self {
        Self {
            store,
            platform,
            broadcast,
        }
    }

    /// Register one more participant wanting captions; returns the
    /// active captions id.
    ///
    /// The first join of an epoch (count 0 -> 1) requires an admin role
    /// and is the only one that reaches the platform.
    pub async fn join(&self, room: &str, role: Role) -> CoreResult<String> {
        let state = self
            .store
            .get(room)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("room '{}'", room)))?;

        let session_id = state
            .session_id
            .clone()
            .ok_or_else(|| CoreError::NotFound(format!("room '{}' has no session", room)))?;

        // Gate the 0->1 edge before any mutation.
        if state.captions_user_count == 0 {
            ensure_admin(role, "enable captions")?;
        }

        let count = self.store.increment_captions_count(room).await?;

        if count == 1 {
            info!("Enabling captions for room '{}' (session {})", room, session_id);

            let captions_id = self.platform.enable_captions(&session_id).await?;

            self.store
                .put(room, RoomPatch::captions_id(&captions_id))
                .await?;

            self.send_signal(
                &session_id,
                &CaptionsSignal::Enable {
                    captions_id: captions_id.clone(),
                },
            )
            .await;

            info!("Captions enabled for room '{}': {}", room, captions_id);
            return Ok(captions_id);
        }

        // Captions already active (or being activated); hand out the
        // stored id without touching the platform.
        match self.store.get(room).await?.and_then(|s| s.captions_id) {
            Some(captions_id) => Ok(captions_id),
            None => Err(CoreError::Transient(format!(
                "captions for room '{}' are still being enabled",
                room
            ))),
        }
    }

    /// Unregister one participant; disables the platform feature when
    /// the last one leaves.
    pub async fn leave(&self, room: &str, captions_id: &str, role: Role) -> CoreResult<CaptionsStatus> {
        // Reject malformed ids before any storage mutation.
        if Uuid::parse_str(captions_id).is_err() {
            return Err(CoreError::InvalidArgument(format!(
                "captions id '{}' is not a valid UUID",
                captions_id
            )));
        }

        let state = self
            .store
            .get(room)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("room '{}'", room)))?;

        let session_id = state
            .session_id
            .clone()
            .ok_or_else(|| CoreError::NotFound(format!("room '{}' has no session", room)))?;

        // Gate the 1->0 edge before any mutation.
        if state.captions_user_count == 1 {
            ensure_admin(role, "disable captions")?;
        }

        let count = self.store.decrement_captions_count(room).await?;

        if count > 0 {
            return Ok(CaptionsStatus::StillActive { remaining: count });
        }

        // The supplied id is only shape-checked; the stored id is
        // authoritative for the platform call.
        let stored = state.captions_id;
        match stored {
            Some(active_id) => {
                info!("Disabling captions for room '{}': {}", room, active_id);

                self.platform.disable_captions(&active_id).await?;
                self.store.put(room, RoomPatch::clear_captions_id()).await?;
                self.send_signal(&session_id, &CaptionsSignal::Disable).await;

                info!("Captions disabled for room '{}'", room);
                Ok(CaptionsStatus::Disabled)
            }

            // Already cleared by a concurrent disable: the leave is
            // already resolved, not an error.
            None => Ok(CaptionsStatus::AlreadyDisabled),
        }
    }

    /// The broadcast bus is best-effort; a lost outcome signal is
    /// recovered by the request-status reconciliation, so a publish
    /// failure never fails the operation.
    async fn send_signal(&self, session_id: &str, signal: &CaptionsSignal) {
        if let Err(e) = self.broadcast.send_to_room(session_id, signal).await {
            warn!("Failed to broadcast captions signal: {}", e);
        }
    }
}
