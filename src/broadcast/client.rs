use super::signals::CaptionsSignal;
use crate::error::{CoreError, CoreResult};
use anyhow::{Context, Result};
use async_nats::{Client, Subscriber};
use tracing::{debug, info};

/// Session-scoped signal fan-out.
///
/// Implementations deliver to all currently connected participants of
/// the session with no acknowledgement and no ordering guarantee.
#[async_trait::async_trait]
pub trait SignalBroadcast: Send + Sync {
    async fn send_to_room(&self, session_id: &str, signal: &CaptionsSignal) -> CoreResult<()>;
}

/// NATS-backed broadcast channel; one subject per session.
pub struct NatsBroadcast {
    client: Client,
    subject_prefix: String,
}

impl NatsBroadcast {
    /// Connect to the NATS server.
    pub async fn connect(url: &str, subject_prefix: &str) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self {
            client,
            subject_prefix: subject_prefix.to_string(),
        })
    }

    fn subject(&self, session_id: &str) -> String {
        format!("{}.{}", self.subject_prefix, session_id)
    }

    /// Subscribe to the session's signal subject; used by the
    /// per-participant listener.
    pub async fn subscribe(&self, session_id: &str) -> Result<Subscriber> {
        let subject = self.subject(session_id);
        info!("Subscribing to captions signals on {}", subject);

        let subscriber = self
            .client
            .subscribe(subject)
            .await
            .context("Failed to subscribe to captions signals")?;

        Ok(subscriber)
    }
}

#[async_trait::async_trait]
impl SignalBroadcast for NatsBroadcast {
    async fn send_to_room(&self, session_id: &str, signal: &CaptionsSignal) -> CoreResult<()> {
        let subject = self.subject(session_id);
        let payload = signal.encode();

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .map_err(|e| CoreError::Transient(format!("failed to publish signal: {}", e)))?;

        debug!("Published captions signal to {}", subject);
        Ok(())
    }
}
