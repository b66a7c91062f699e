use crate::captions::CaptionsCoordinator;
use crate::platform::VideoPlatform;
use crate::session::SessionResolver;
use crate::store::RoomStore;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Room name -> session id resolution (single-flight)
    pub resolver: Arc<SessionResolver>,

    /// Server-side captions reference counting
    pub captions: Arc<CaptionsCoordinator>,

    /// Video platform client (tokens, recordings)
    pub platform: Arc<dyn VideoPlatform>,

    /// Room state persistence
    pub store: Arc<dyn RoomStore>,
}

impl AppState {
    pub fn new(
        resolver: Arc<SessionResolver>,
        captions: Arc<CaptionsCoordinator>,
        platform: Arc<dyn VideoPlatform>,
        store: Arc<dyn RoomStore>,
    ) -> Self {
        Self {
            resolver,
            captions,
            platform,
            store,
        }
    }
}
