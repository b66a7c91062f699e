//! Room-to-session resolution
//!
//! This module provides the `SessionResolver` abstraction that maps a
//! user-facing room name onto exactly one platform media session:
//! - read-through caching of the session id in the room store
//! - per-room single-flight creation under concurrent requests
//! - failure fan-out so waiters are never left hanging

mod resolver;

pub use resolver::SessionResolver;
