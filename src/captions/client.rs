use crate::broadcast::CaptionsSignal;

/// Side effect requested by the state machine.
///
/// The machine itself never performs I/O; the driver executes effects
/// after `apply` returns, so a participant never awaits its own
/// broadcast delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignalEffect {
    /// Broadcast a signal to the room.
    Send(CaptionsSignal),

    /// Call the server-side leave path for convergence.
    LeaveServer { captions_id: String },
}

/// Per-participant captions state machine.
///
/// Driven purely by inbound `CaptionsSignal` messages, which may arrive
/// in any order, be duplicated, or never arrive at all. Every
/// transition is idempotent and every piece of derived state can be
/// re-derived from a later signal; a participant that joined after
/// captions were enabled bootstraps through `request-status`.
#[derive(Debug)]
pub struct CaptionsClient {
    participant_id: String,
    current_captions_id: Option<String>,
    active_count: u64,
    enabled_locally: bool,
}

impl CaptionsClient {
    pub fn new(participant_id: impl Into<String>) -> Self {
        Self {
            participant_id: participant_id.into(),
            current_captions_id: None,
            active_count: 0,
            enabled_locally: false,
        }
    }

    pub fn participant_id(&self) -> &str {
        &self.participant_id
    }

    pub fn captions_id(&self) -> Option<&str> {
        self.current_captions_id.as_deref()
    }

    pub fn active_count(&self) -> u64 {
        self.active_count
    }

    pub fn is_enabled_locally(&self) -> bool {
        self.enabled_locally
    }

    /// Signal asking the room for its current captions state; sent when
    /// this participant connects, so admission order does not matter.
    pub fn bootstrap(&self) -> CaptionsSignal {
        CaptionsSignal::RequestStatus {
            participant_id: self.participant_id.clone(),
        }
    }

    /// Record a successful server-side captions join and build the
    /// announcement for the rest of the room.
    pub fn announce_join(&mut self, captions_id: impl Into<String>) -> CaptionsSignal {
        self.current_captions_id = Some(captions_id.into());
        self.enabled_locally = true;
        self.active_count += 1;

        CaptionsSignal::Join {
            participant_id: self.participant_id.clone(),
            current_count: self.active_count,
        }
    }

    /// Record a local captions stop and build the announcement for the
    /// rest of the room.
    pub fn announce_leave(&mut self) -> CaptionsSignal {
        self.enabled_locally = false;
        self.active_count = self.active_count.saturating_sub(1);

        CaptionsSignal::Leave {
            captions_id: self.current_captions_id.clone(),
        }
    }

    /// Feed one inbound signal through the machine and collect the
    /// effects the driver must execute.
    pub fn apply(&mut self, signal: CaptionsSignal) -> Vec<SignalEffect> {
        match signal {
            CaptionsSignal::Enable { captions_id } => {
                self.current_captions_id = Some(captions_id);
                self.enabled_locally = true;
                Vec::new()
            }

            CaptionsSignal::Disable => {
                let held = self.current_captions_id.take();
                self.active_count = 0;
                self.enabled_locally = false;

                // A participant still holding an id re-runs the server
                // leave path; a second leave on an already-cleared id
                // is a no-op at the server, so this converges rather
                // than oscillates.
                match held {
                    Some(captions_id) => vec![SignalEffect::LeaveServer { captions_id }],
                    None => Vec::new(),
                }
            }

            CaptionsSignal::Join {
                participant_id,
                current_count: _,
            } => {
                if participant_id == self.participant_id {
                    // Own announcement echoed back: the local count was
                    // already bumped by `announce_join`. Reply with what
                    // we know so peers that missed earlier signals can
                    // still reconcile.
                    vec![SignalEffect::Send(self.status_response())]
                } else {
                    self.active_count += 1;
                    Vec::new()
                }
            }

            CaptionsSignal::Leave { captions_id: _ } => {
                self.active_count = self.active_count.saturating_sub(1);

                if self.active_count == 0 {
                    vec![SignalEffect::Send(CaptionsSignal::UpdateCount {
                        current_count: 0,
                    })]
                } else {
                    Vec::new()
                }
            }

            CaptionsSignal::UpdateCount { current_count } => {
                // Last-writer-wins; the server-held count is the source
                // of truth for the platform transitions, this one only
                // feeds discovery.
                self.active_count = current_count;
                Vec::new()
            }

            CaptionsSignal::RequestStatus { participant_id } => {
                if participant_id == self.participant_id {
                    // Our own request echoed back.
                    Vec::new()
                } else {
                    vec![SignalEffect::Send(self.status_response())]
                }
            }

            CaptionsSignal::StatusResponse {
                captions_id,
                current_count,
            } => {
                if self.current_captions_id.is_none() {
                    if let Some(id) = captions_id {
                        self.current_captions_id = Some(id);
                        self.enabled_locally = true;
                    }
                }
                if self.active_count == 0 {
                    self.active_count = current_count;
                }
                Vec::new()
            }
        }
    }

    fn status_response(&self) -> CaptionsSignal {
        CaptionsSignal::StatusResponse {
            captions_id: self.current_captions_id.clone(),
            current_count: self.active_count,
        }
    }
}
