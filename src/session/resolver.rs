use crate::error::{CoreError, CoreResult};
use crate::platform::VideoPlatform;
use crate::store::{RoomPatch, RoomStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

type FlightResult = CoreResult<String>;

enum Flight {
    Leader(broadcast::Sender<FlightResult>),
    Waiter(broadcast::Receiver<FlightResult>),
}

/// Resolves a room name to its platform session id, creating the
/// session on first access.
///
/// Concurrent resolutions of the same room share one in-flight
/// creation: the first caller becomes the leader and every other caller
/// awaits the leader's result, so the platform sees at most one
/// concurrent create per room name. Distinct rooms never block each
/// other. The in-flight registry is owned by the resolver instance,
/// not a process-wide singleton.
pub struct SessionResolver {
    store: Arc<dyn RoomStore>,
    platform: Arc<dyn VideoPlatform>,
    in_flight: Mutex<HashMap<String, broadcast::Sender<FlightResult>>>,
}

impl SessionResolver {
    pub fn new(store: Arc<dyn RoomStore>, platform: Arc<dyn VideoPlatform>) -> Self {
        Self {
            store,
            platform,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Return the room's session id, minting one via the platform on
    /// first access.
    pub async fn resolve(&self, room: &str) -> CoreResult<String> {
        if let Some(id) = self.stored_session_id(room).await? {
            return Ok(id);
        }

        let flight = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(room) {
                Some(tx) => Flight::Waiter(tx.subscribe()),
                None => {
                    let (tx, _rx) = broadcast::channel(1);
                    in_flight.insert(room.to_string(), tx.clone());
                    Flight::Leader(tx)
                }
            }
        };

        match flight {
            Flight::Waiter(mut rx) => match rx.recv().await {
                Ok(result) => result,
                Err(_) => Err(CoreError::Transient(format!(
                    "session creation for room '{}' was abandoned",
                    room
                ))),
            },

            Flight::Leader(tx) => {
                let result = self.create_and_store(room).await;

                // Remove the entry and publish under the same lock so a
                // caller either finds the in-flight entry (and receives
                // this result) or misses it and re-reads the store.
                let mut in_flight = self.in_flight.lock().await;
                in_flight.remove(room);
                let _ = tx.send(result.clone());
                drop(in_flight);

                result
            }
        }
    }

    async fn stored_session_id(&self, room: &str) -> CoreResult<Option<String>> {
        Ok(self
            .store
            .get(room)
            .await?
            .and_then(|state| state.session_id))
    }

    async fn create_and_store(&self, room: &str) -> CoreResult<String> {
        // The fast-path read may be stale by the time leadership is
        // acquired; read again before paying for a platform call.
        if let Some(id) = self.stored_session_id(room).await? {
            return Ok(id);
        }

        info!("Creating platform session for room: {}", room);
        let session_id = self.platform.create_session().await?;

        let merged = self
            .store
            .put(room, RoomPatch::session_id(&session_id))
            .await?;

        // First write wins in the store; if another backend instance
        // got there first, hand out its id rather than fragmenting the
        // room across two sessions.
        let winner = merged.session_id.unwrap_or_else(|| session_id.clone());
        if winner != session_id {
            warn!(
                "Lost session creation race for room '{}'; using existing session {}",
                room, winner
            );
        } else {
            info!("Room '{}' resolved to new session {}", room, winner);
        }

        Ok(winner)
    }
}
