pub mod broadcast;
pub mod captions;
pub mod config;
pub mod error;
pub mod http;
pub mod platform;
pub mod role;
pub mod session;
pub mod store;

pub use broadcast::{CaptionsSignal, NatsBroadcast, SignalBroadcast};
pub use captions::{
    CaptionsClient, CaptionsCoordinator, CaptionsListener, CaptionsStatus, SignalEffect,
};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use http::{create_router, AppState};
pub use platform::{HttpVideoPlatform, VideoPlatform};
pub use role::Role;
pub use session::SessionResolver;
pub use store::{MemoryRoomStore, RoomPatch, RoomState, RoomStore, RoomStoreFactory};
