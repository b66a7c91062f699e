use super::{RoomPatch, RoomState, RoomStore};
use crate::error::CoreResult;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct Entry {
    state: RoomState,
    expires_at: Instant,
}

/// Process-local room store.
///
/// A mutex-guarded map; increments and decrements are atomic with
/// respect to concurrent callers because every operation holds the
/// lock. Expiry is checked lazily on access rather than by a reaper
/// task, which is sufficient for single-instance deployments and tests.
pub struct MemoryRoomStore {
    ttl: Duration,
    rooms: Mutex<HashMap<String, Entry>>,
}

impl MemoryRoomStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            rooms: Mutex::new(HashMap::new()),
        }
    }

    fn drop_if_expired(rooms: &mut HashMap<String, Entry>, room: &str, now: Instant) {
        let expired = rooms.get(room).is_some_and(|e| e.expires_at <= now);
        if expired {
            rooms.remove(room);
        }
    }

    /// Fetch-or-create the entry for `room`, resetting it first if its
    /// TTL has lapsed, and refresh its deadline.
    fn entry_or_default<'a>(
        &self,
        rooms: &'a mut HashMap<String, Entry>,
        room: &str,
    ) -> &'a mut Entry {
        let now = Instant::now();
        Self::drop_if_expired(rooms, room, now);

        let entry = rooms.entry(room.to_string()).or_insert_with(|| Entry {
            state: RoomState::default(),
            expires_at: now + self.ttl,
        });
        entry.expires_at = now + self.ttl;
        entry
    }
}

#[async_trait::async_trait]
impl RoomStore for MemoryRoomStore {
    async fn get(&self, room: &str) -> CoreResult<Option<RoomState>> {
        let mut rooms = self.rooms.lock().await;
        let now = Instant::now();
        Self::drop_if_expired(&mut rooms, room, now);

        Ok(rooms.get_mut(room).map(|entry| {
            entry.expires_at = now + self.ttl;
            entry.state.clone()
        }))
    }

    async fn put(&self, room: &str, patch: RoomPatch) -> CoreResult<RoomState> {
        let mut rooms = self.rooms.lock().await;
        let entry = self.entry_or_default(&mut rooms, room);

        if entry.state.session_id.is_none() {
            if let Some(id) = patch.session_id_value() {
                entry.state.session_id = Some(id.to_string());
            }
        }

        if let Some(captions) = patch.captions_id_value() {
            entry.state.captions_id = captions.map(str::to_string);
        }

        Ok(entry.state.clone())
    }

    async fn increment_captions_count(&self, room: &str) -> CoreResult<u64> {
        let mut rooms = self.rooms.lock().await;
        let entry = self.entry_or_default(&mut rooms, room);
        entry.state.captions_user_count += 1;
        Ok(entry.state.captions_user_count)
    }

    async fn decrement_captions_count(&self, room: &str) -> CoreResult<u64> {
        let mut rooms = self.rooms.lock().await;
        let entry = self.entry_or_default(&mut rooms, room);
        entry.state.captions_user_count = entry.state.captions_user_count.saturating_sub(1);
        Ok(entry.state.captions_user_count)
    }
}
