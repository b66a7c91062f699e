//! Broadcast channel for captions signals
//!
//! An unordered, best-effort, at-most-once fan-out bus scoped to a
//! session's participants, carried over NATS with one subject per
//! session.

pub mod client;
pub mod signals;

pub use client::{NatsBroadcast, SignalBroadcast};
pub use signals::CaptionsSignal;
