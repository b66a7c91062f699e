use serde::{Deserialize, Serialize};
use tracing::warn;

/// Ephemeral captions signal carried over the broadcast channel.
///
/// Delivery is at-most-once, unordered, and best-effort, so every
/// consumer must treat signals as idempotent and re-derivable: a
/// participant that missed `enable` can still converge through the
/// `request-status` / `status-response` pair. Signals are never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CaptionsSignal {
    /// Captions were turned on for the room.
    Enable { captions_id: String },

    /// Captions were turned off for the room.
    Disable,

    /// A participant started requesting captions.
    Join {
        participant_id: String,
        current_count: u64,
    },

    /// A participant stopped requesting captions.
    Leave { captions_id: Option<String> },

    /// Last-writer-wins count reconciliation; the server-held count
    /// remains the source of truth for the platform transitions.
    UpdateCount { current_count: u64 },

    /// A late joiner asking the room for its current captions state.
    RequestStatus { participant_id: String },

    /// Reply to `request-status`, built from the sender's local state.
    StatusResponse {
        captions_id: Option<String>,
        current_count: u64,
    },
}

impl CaptionsSignal {
    pub fn encode(&self) -> Vec<u8> {
        // Serialization of an internally-tagged enum with these field
        // types cannot fail.
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Decode an inbound payload. Unrecognized kinds and malformed
    /// payloads are logged and dropped, never raised; a single bad
    /// message must not destabilize a participant's session.
    pub fn decode(payload: &[u8]) -> Option<Self> {
        match serde_json::from_slice(payload) {
            Ok(signal) => Some(signal),
            Err(e) => {
                warn!("Ignoring unrecognized captions signal: {}", e);
                None
            }
        }
    }
}
