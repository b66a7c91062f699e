//! Live-captions consistency protocol
//!
//! Server side: `CaptionsCoordinator` reference-counts "who wants
//! captions" per room and drives the platform enable/disable calls
//! exactly at the 0->1 and 1->0 transitions.
//!
//! Client side: `CaptionsClient` is the per-participant state machine
//! reconciling room state from broadcast signals, and
//! `CaptionsListener` is the task that drives it from NATS.

mod client;
mod coordinator;
mod listener;

pub use client::{CaptionsClient, SignalEffect};
pub use coordinator::{CaptionsCoordinator, CaptionsStatus};
pub use listener::CaptionsListener;
