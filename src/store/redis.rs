use super::{RoomPatch, RoomState, RoomStore};
use crate::error::{CoreError, CoreResult};
use anyhow::{Context, Result};
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::time::Duration;
use tracing::info;

/// Distributed room store backed by Redis.
///
/// The session id, captions id, and captions count live on independent
/// keys so that a race on the counting path can never corrupt the
/// session-resolution path. The count uses native `INCR`/`DECR`
/// (never read-modify-write) because it gates the expensive platform
/// enable/disable calls; the session id is written with `SET NX` so the
/// first writer wins across backend instances.
pub struct RedisRoomStore {
    conn: ConnectionManager,
    prefix: String,
    ttl_secs: i64,
}

impl RedisRoomStore {
    /// Connect to the Redis server.
    pub async fn connect(url: &str, prefix: &str, ttl: Duration) -> Result<Self> {
        info!("Connecting to Redis at {}", url);

        let client = Client::open(url).context("Invalid Redis URL")?;
        let conn = ConnectionManager::new(client)
            .await
            .context("Failed to connect to Redis")?;

        info!("Connected to Redis successfully");

        Ok(Self {
            conn,
            prefix: prefix.to_string(),
            ttl_secs: ttl.as_secs() as i64,
        })
    }

    fn key(&self, room: &str, field: &str) -> String {
        format!("{}:{}:{}", self.prefix, room, field)
    }

    /// Refresh the TTL of every key belonging to `room`. `EXPIRE` on a
    /// missing key is a no-op.
    async fn touch(&self, conn: &mut ConnectionManager, room: &str) -> CoreResult<()> {
        for field in ["session", "captions", "captions_count"] {
            let _: bool = conn
                .expire(self.key(room, field), self.ttl_secs)
                .await
                .map_err(store_err)?;
        }
        Ok(())
    }

    async fn read_state(
        &self,
        conn: &mut ConnectionManager,
        room: &str,
    ) -> CoreResult<Option<RoomState>> {
        let session_id: Option<String> =
            conn.get(self.key(room, "session")).await.map_err(store_err)?;
        let captions_id: Option<String> =
            conn.get(self.key(room, "captions")).await.map_err(store_err)?;
        let count: Option<i64> = conn
            .get(self.key(room, "captions_count"))
            .await
            .map_err(store_err)?;

        if session_id.is_none() && captions_id.is_none() && count.is_none() {
            return Ok(None);
        }

        Ok(Some(RoomState {
            session_id,
            captions_id,
            captions_user_count: count.unwrap_or(0).max(0) as u64,
        }))
    }
}

#[async_trait::async_trait]
impl RoomStore for RedisRoomStore {
    async fn get(&self, room: &str) -> CoreResult<Option<RoomState>> {
        let mut conn = self.conn.clone();
        let state = self.read_state(&mut conn, room).await?;

        if state.is_some() {
            self.touch(&mut conn, room).await?;
        }

        Ok(state)
    }

    async fn put(&self, room: &str, patch: RoomPatch) -> CoreResult<RoomState> {
        let mut conn = self.conn.clone();

        if let Some(id) = patch.session_id_value() {
            // First writer wins; a concurrent resolution that lost the
            // race observes the winner in the returned state.
            let _: bool = conn
                .set_nx(self.key(room, "session"), id)
                .await
                .map_err(store_err)?;
        }

        match patch.captions_id_value() {
            Some(Some(id)) => {
                let _: () = conn
                    .set(self.key(room, "captions"), id)
                    .await
                    .map_err(store_err)?;
            }
            Some(None) => {
                let _: () = conn
                    .del(self.key(room, "captions"))
                    .await
                    .map_err(store_err)?;
            }
            None => {}
        }

        self.touch(&mut conn, room).await?;
        let state = self.read_state(&mut conn, room).await?;
        Ok(state.unwrap_or_default())
    }

    async fn increment_captions_count(&self, room: &str) -> CoreResult<u64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn
            .incr(self.key(room, "captions_count"), 1)
            .await
            .map_err(store_err)?;

        self.touch(&mut conn, room).await?;
        Ok(count.max(0) as u64)
    }

    async fn decrement_captions_count(&self, room: &str) -> CoreResult<u64> {
        let mut conn = self.conn.clone();
        let count: i64 = conn
            .decr(self.key(room, "captions_count"), 1)
            .await
            .map_err(store_err)?;

        // DECR has no floor; clamp stored underflow back to zero so a
        // leave-before-join can never push the count negative.
        if count < 0 {
            let _: () = conn
                .set(self.key(room, "captions_count"), 0)
                .await
                .map_err(store_err)?;
        }

        self.touch(&mut conn, room).await?;
        Ok(count.max(0) as u64)
    }
}

fn store_err(e: redis::RedisError) -> CoreError {
    CoreError::Transient(format!("redis: {}", e))
}
