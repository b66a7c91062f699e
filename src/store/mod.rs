//! Room state persistence
//!
//! Every room is a single logical record (`RoomState`) behind the
//! `RoomStore` trait. Two interchangeable backends:
//! - `MemoryRoomStore`: single process, mutex-guarded map (deployments
//!   with one backend instance, and tests)
//! - `RedisRoomStore`: shared across instances, native atomic counters
//!   and per-key expiry
//!
//! All mutation of room state goes through the narrow operations on the
//! trait; nothing else writes these fields.

mod memory;
mod redis;

pub use memory::MemoryRoomStore;
pub use redis::RedisRoomStore;

use crate::config::StoreConfig;
use crate::error::CoreResult;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Per-room record, keyed by the user-supplied room name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomState {
    /// Video platform session handle. First write wins; never
    /// overwritten while the entry lives, so concurrent resolutions of
    /// the same room cannot fragment participants across sessions.
    pub session_id: Option<String>,

    /// Identifier of the active captions feature instance, present only
    /// while captions are enabled for the room.
    pub captions_id: Option<String>,

    /// Participants who asked for captions and have not yet left.
    pub captions_user_count: u64,
}

/// Merge patch for `RoomStore::put`. Absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct RoomPatch {
    session_id: Option<String>,
    captions_id: Option<Option<String>>,
}

impl RoomPatch {
    /// Record the platform session id. Applied only when the room has
    /// none yet; the merged state returned by `put` carries the winner.
    pub fn session_id(id: impl Into<String>) -> Self {
        Self {
            session_id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Set the active captions id.
    pub fn captions_id(id: impl Into<String>) -> Self {
        Self {
            captions_id: Some(Some(id.into())),
            ..Self::default()
        }
    }

    /// Clear the active captions id.
    pub fn clear_captions_id() -> Self {
        Self {
            captions_id: Some(None),
            ..Self::default()
        }
    }

    pub(crate) fn session_id_value(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub(crate) fn captions_id_value(&self) -> Option<Option<&str>> {
        self.captions_id.as_ref().map(|c| c.as_deref())
    }
}

/// Storage contract for room state.
///
/// Every read and write refreshes the entry's TTL; an idle room expires
/// and the next resolution starts fresh. Failures surface as retryable
/// `Transient` errors and never fabricate a `RoomState`.
#[async_trait::async_trait]
pub trait RoomStore: Send + Sync {
    /// Fetch the room's state, if any.
    async fn get(&self, room: &str) -> CoreResult<Option<RoomState>>;

    /// Merge a patch into the room's state (creating it if absent) and
    /// return the post-merge state.
    async fn put(&self, room: &str, patch: RoomPatch) -> CoreResult<RoomState>;

    /// Atomically bump the captions reference count; returns the new
    /// count.
    async fn increment_captions_count(&self, room: &str) -> CoreResult<u64>;

    /// Atomically drop the captions reference count, clamped at zero;
    /// returns the new count.
    async fn decrement_captions_count(&self, room: &str) -> CoreResult<u64>;
}

/// Room store factory
pub struct RoomStoreFactory;

impl RoomStoreFactory {
    /// Create the store backend selected by configuration.
    pub async fn create(config: &StoreConfig) -> Result<Arc<dyn RoomStore>> {
        let ttl = Duration::from_secs(config.ttl_secs);

        match config.backend.as_str() {
            "memory" => Ok(Arc::new(MemoryRoomStore::new(ttl))),

            "redis" => {
                let url = config
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("store.redis_url is required for the redis backend"))?;
                let store = RedisRoomStore::connect(url, &config.key_prefix, ttl).await?;
                Ok(Arc::new(store))
            }

            other => anyhow::bail!("unknown store backend '{}'", other),
        }
    }
}
