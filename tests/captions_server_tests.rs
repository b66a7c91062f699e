// Integration tests for server-side captions reference counting.
//
// The platform must be reached exactly at the 0->1 and 1->0 edges,
// the first/last edges are admin-gated, and an already-disabled leave
// resolves as a no-op rather than an error.

mod common;

use common::{MockBroadcast, MockPlatform};
use huddle_rooms::{
    CaptionsCoordinator, CaptionsSignal, CaptionsStatus, CoreError, MemoryRoomStore, RoomPatch,
    RoomStore, Role,
};
use std::sync::Arc;
use std::time::Duration;

struct Fixture {
    store: Arc<dyn RoomStore>,
    platform: Arc<MockPlatform>,
    broadcast: Arc<MockBroadcast>,
    coordinator: CaptionsCoordinator,
}

async fn fixture_with_session(room: &str) -> Fixture {
    let fixture = fixture();
    fixture
        .store
        .put(room, RoomPatch::session_id("session1"))
        .await
        .unwrap();
    fixture
}

fn fixture() -> Fixture {
    let store: Arc<dyn RoomStore> = Arc::new(MemoryRoomStore::new(Duration::from_secs(60)));
    let platform = Arc::new(MockPlatform::new(&[]));
    let broadcast = Arc::new(MockBroadcast::new());

    let coordinator = CaptionsCoordinator::new(
        Arc::clone(&store),
        Arc::clone(&platform) as Arc<dyn huddle_rooms::VideoPlatform>,
        Arc::clone(&broadcast) as Arc<dyn huddle_rooms::SignalBroadcast>,
    );

    Fixture {
        store,
        platform,
        broadcast,
        coordinator,
    }
}

#[tokio::test]
async fn test_first_join_enables_platform_captions() {
    let f = fixture_with_session("standup").await;

    let captions_id = f.coordinator.join("standup", Role::Admin).await.unwrap();

    assert_eq!(f.platform.enable_calls(), 1);
    assert_eq!(f.platform.last_captions_id(), Some(captions_id.clone()));

    let state = f.store.get("standup").await.unwrap().unwrap();
    assert_eq!(state.captions_id.as_deref(), Some(captions_id.as_str()));
    assert_eq!(state.captions_user_count, 1);

    let sent = f.broadcast.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "session1");
    assert_eq!(sent[0].1, CaptionsSignal::Enable { captions_id });
}

#[tokio::test]
async fn test_later_joins_reuse_active_captions() {
    let f = fixture_with_session("standup").await;

    let first = f.coordinator.join("standup", Role::Admin).await.unwrap();
    let second = f
        .coordinator
        .join("standup", Role::Participant)
        .await
        .unwrap();
    let third = f.coordinator.join("standup", Role::Viewer).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first, third);
    // Only the 0->1 edge reached the platform.
    assert_eq!(f.platform.enable_calls(), 1);

    let state = f.store.get("standup").await.unwrap().unwrap();
    assert_eq!(state.captions_user_count, 3);
}

#[tokio::test]
async fn test_non_admin_cannot_enable() {
    let f = fixture_with_session("standup").await;

    let err = f
        .coordinator
        .join("standup", Role::Participant)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PermissionDenied(_)));
    assert_eq!(f.platform.enable_calls(), 0);

    // The denied join must not leak into the count.
    let state = f.store.get("standup").await.unwrap().unwrap();
    assert_eq!(state.captions_user_count, 0);
}

#[tokio::test]
async fn test_join_unknown_room() {
    let f = fixture();

    let err = f.coordinator.join("nowhere", Role::Admin).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_join_room_without_session() {
    let f = fixture();
    f.store
        .put("standup", RoomPatch::clear_captions_id())
        .await
        .unwrap();

    let err = f.coordinator.join("standup", Role::Admin).await.unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_last_leave_disables_platform_captions() {
    let f = fixture_with_session("standup").await;

    let captions_id = f.coordinator.join("standup", Role::Admin).await.unwrap();
    f.coordinator
        .join("standup", Role::Participant)
        .await
        .unwrap();
    f.coordinator.join("standup", Role::Viewer).await.unwrap();

    let first = f
        .coordinator
        .leave("standup", &captions_id, Role::Participant)
        .await
        .unwrap();
    assert_eq!(first, CaptionsStatus::StillActive { remaining: 2 });

    let second = f
        .coordinator
        .leave("standup", &captions_id, Role::Viewer)
        .await
        .unwrap();
    assert_eq!(second, CaptionsStatus::StillActive { remaining: 1 });
    assert_eq!(f.platform.disable_calls(), 0);

    let last = f
        .coordinator
        .leave("standup", &captions_id, Role::Admin)
        .await
        .unwrap();
    assert_eq!(last, CaptionsStatus::Disabled);
    assert_eq!(f.platform.disable_calls(), 1);
    assert_eq!(f.platform.disabled_ids(), vec![captions_id]);

    let state = f.store.get("standup").await.unwrap().unwrap();
    assert_eq!(state.captions_id, None);
    assert_eq!(state.captions_user_count, 0);

    // Enable at the start, disable at the end, nothing in between.
    let sent = f.broadcast.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].1, CaptionsSignal::Disable);
}

#[tokio::test]
async fn test_non_admin_cannot_disable_last() {
    let f = fixture_with_session("standup").await;

    let captions_id = f.coordinator.join("standup", Role::Admin).await.unwrap();

    let err = f
        .coordinator
        .leave("standup", &captions_id, Role::Participant)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::PermissionDenied(_)));
    assert_eq!(f.platform.disable_calls(), 0);

    let state = f.store.get("standup").await.unwrap().unwrap();
    assert_eq!(state.captions_user_count, 1);
}

#[tokio::test]
async fn test_leave_rejects_malformed_id() {
    let f = fixture_with_session("standup").await;

    f.coordinator.join("standup", Role::Admin).await.unwrap();

    let err = f
        .coordinator
        .leave("standup", "not-a-uuid", Role::Admin)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidArgument(_)));

    // Rejected before any mutation.
    let state = f.store.get("standup").await.unwrap().unwrap();
    assert_eq!(state.captions_user_count, 1);
}

#[tokio::test]
async fn test_leave_when_already_disabled_is_noop() {
    let f = fixture_with_session("standup").await;

    let status = f
        .coordinator
        .leave(
            "standup",
            "11111111-2222-3333-4444-555555555555",
            Role::Admin,
        )
        .await
        .unwrap();

    assert_eq!(status, CaptionsStatus::AlreadyDisabled);
    assert_eq!(f.platform.disable_calls(), 0);

    let state = f.store.get("standup").await.unwrap().unwrap();
    assert_eq!(state.captions_user_count, 0);
}

#[tokio::test]
async fn test_reenable_after_disable_starts_new_epoch() {
    let f = fixture_with_session("standup").await;

    let first_id = f.coordinator.join("standup", Role::Admin).await.unwrap();
    f.coordinator
        .leave("standup", &first_id, Role::Admin)
        .await
        .unwrap();

    let second_id = f.coordinator.join("standup", Role::Admin).await.unwrap();

    assert_ne!(first_id, second_id);
    assert_eq!(f.platform.enable_calls(), 2);
    assert_eq!(f.platform.disable_calls(), 1);
}
