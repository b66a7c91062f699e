// Integration tests for room-to-session resolution.
//
// The property under test: no matter how many callers resolve the same
// room at once, the platform sees at most one session creation, and
// every caller ends up in the same session.

mod common;

use common::MockPlatform;
use huddle_rooms::{CoreError, MemoryRoomStore, RoomStore, SessionResolver, VideoPlatform};
use std::sync::Arc;
use std::time::Duration;

fn resolver_with(platform: Arc<MockPlatform>) -> Arc<SessionResolver> {
    let store: Arc<dyn RoomStore> = Arc::new(MemoryRoomStore::new(Duration::from_secs(60)));
    let platform: Arc<dyn VideoPlatform> = platform;
    Arc::new(SessionResolver::new(store, platform))
}

#[tokio::test]
async fn test_resolve_creates_session_on_first_access() {
    let platform = Arc::new(MockPlatform::new(&["session1"]));
    let resolver = resolver_with(Arc::clone(&platform));

    let id = resolver.resolve("standup").await.unwrap();

    assert_eq!(id, "session1");
    assert_eq!(platform.create_calls(), 1);
}

#[tokio::test]
async fn test_resolve_reuses_stored_session() {
    let platform = Arc::new(MockPlatform::new(&["session1", "session2"]));
    let resolver = resolver_with(Arc::clone(&platform));

    let first = resolver.resolve("standup").await.unwrap();
    let second = resolver.resolve("standup").await.unwrap();

    assert_eq!(first, "session1");
    assert_eq!(second, "session1");
    assert_eq!(platform.create_calls(), 1);
}

#[tokio::test]
async fn test_concurrent_resolves_share_one_creation() {
    let platform = Arc::new(
        MockPlatform::new(&["session1", "session2", "session3", "session4"])
            .with_create_delay(Duration::from_millis(50)),
    );
    let resolver = resolver_with(Arc::clone(&platform));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let resolver = Arc::clone(&resolver);
        handles.push(tokio::spawn(async move {
            resolver.resolve("my-new-room").await
        }));
    }

    for handle in handles {
        let id = handle.await.unwrap().unwrap();
        assert_eq!(id, "session1");
    }

    assert_eq!(platform.create_calls(), 1);
}

#[tokio::test]
async fn test_distinct_rooms_resolve_independently() {
    let platform = Arc::new(
        MockPlatform::new(&["session1", "session2"]).with_create_delay(Duration::from_millis(50)),
    );
    let resolver = resolver_with(Arc::clone(&platform));

    let a = {
        let resolver = Arc::clone(&resolver);
        tokio::spawn(async move { resolver.resolve("standup").await })
    };
    let b = {
        let resolver = Arc::clone(&resolver);
        tokio::spawn(async move { resolver.resolve("retro").await })
    };

    let a = a.await.unwrap().unwrap();
    let b = b.await.unwrap().unwrap();

    assert_ne!(a, b);
    assert_eq!(platform.create_calls(), 2);
}

#[tokio::test]
async fn test_failed_creation_reaches_every_waiter() {
    let platform = Arc::new(
        MockPlatform::new(&["session1"]).with_create_delay(Duration::from_millis(50)),
    );
    platform.set_fail_create(true);
    let resolver = resolver_with(Arc::clone(&platform));

    let mut handles = Vec::new();
    for _ in 0..3 {
        let resolver = Arc::clone(&resolver);
        handles.push(tokio::spawn(
            async move { resolver.resolve("standup").await },
        ));
    }

    for handle in handles {
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, CoreError::Transient(_)));
    }

    // Nothing was stored, so a retry attempts a fresh creation.
    platform.set_fail_create(false);
    let id = resolver.resolve("standup").await.unwrap();
    assert_eq!(id, "session1");
}
