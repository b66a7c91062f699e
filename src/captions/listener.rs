use super::client::{CaptionsClient, SignalEffect};
use super::coordinator::CaptionsCoordinator;
use crate::broadcast::{CaptionsSignal, NatsBroadcast, SignalBroadcast};
use crate::role::Role;
use anyhow::{Context, Result};
use futures::stream::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Driver for one participant's captions state machine.
///
/// Subscribes to the room's signal subject, feeds every decoded signal
/// through the `CaptionsClient`, and executes the effects it returns:
/// outbound signals go back over the broadcast channel, convergence
/// leaves go to the server coordinator. Undecodable payloads are
/// dropped with a warning.
pub struct CaptionsListener {
    client: Arc<Mutex<CaptionsClient>>,
    handle: Option<JoinHandle<()>>,
}

impl CaptionsListener {
    /// Subscribe and start the listening task. A `request-status`
    /// bootstrap is sent first so a participant who connected after
    /// captions were enabled discovers the current state.
    pub async fn start(
        nats: Arc<NatsBroadcast>,
        coordinator: Arc<CaptionsCoordinator>,
        room: String,
        session_id: String,
        participant_id: String,
        role: Role,
    ) -> Result<Self> {
        let client = Arc::new(Mutex::new(CaptionsClient::new(participant_id.clone())));

        let mut subscriber = nats
            .subscribe(&session_id)
            .await
            .context("Failed to subscribe to captions signals")?;

        let bootstrap = client.lock().await.bootstrap();
        if let Err(e) = nats.send_to_room(&session_id, &bootstrap).await {
            warn!("Failed to send captions status request: {}", e);
        }

        let task_client = Arc::clone(&client);
        let handle = tokio::spawn(async move {
            info!(
                "Captions listener started for participant {} in room {}",
                participant_id, room
            );

            while let Some(msg) = subscriber.next().await {
                let Some(signal) = CaptionsSignal::decode(&msg.payload) else {
                    continue;
                };

                let effects = {
                    let mut client = task_client.lock().await;
                    client.apply(signal)
                };

                for effect in effects {
                    match effect {
                        SignalEffect::Send(signal) => {
                            if let Err(e) = nats.send_to_room(&session_id, &signal).await {
                                warn!("Failed to broadcast captions signal: {}", e);
                            }
                        }

                        SignalEffect::LeaveServer { captions_id } => {
                            match coordinator.leave(&room, &captions_id, role).await {
                                Ok(status) => {
                                    info!("Convergence leave for room '{}': {:?}", room, status)
                                }
                                Err(e) => warn!("Convergence leave failed: {}", e),
                            }
                        }
                    }
                }
            }

            info!("Captions listener stopped for room {}", room);
        });

        Ok(Self {
            client,
            handle: Some(handle),
        })
    }

    /// Snapshot of the participant's reconciled captions state.
    pub async fn state(&self) -> (Option<String>, u64, bool) {
        let client = self.client.lock().await;
        (
            client.captions_id().map(str::to_string),
            client.active_count(),
            client.is_enabled_locally(),
        )
    }

    /// Stop the listening task.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CaptionsListener {
    fn drop(&mut self) {
        self.stop();
    }
}
