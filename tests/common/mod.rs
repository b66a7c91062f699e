// Shared test doubles for the platform and broadcast seams.
//
// `MockPlatform` hands out scripted session ids and counts every call
// so tests can assert how often the platform was actually reached.
// `MockBroadcast` records published signals instead of delivering them.

use async_trait::async_trait;
use huddle_rooms::{CaptionsSignal, CoreError, CoreResult, Role, SignalBroadcast, VideoPlatform};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use uuid::Uuid;

pub struct MockPlatform {
    session_ids: Mutex<VecDeque<String>>,
    create_calls: AtomicUsize,
    enable_calls: AtomicUsize,
    disable_calls: AtomicUsize,
    captions_ids: Mutex<Vec<String>>,
    disabled_ids: Mutex<Vec<String>>,
    fail_create: AtomicBool,
    create_delay: Option<Duration>,
}

impl MockPlatform {
    pub fn new(session_ids: &[&str]) -> Self {
        Self {
            session_ids: Mutex::new(session_ids.iter().map(|s| s.to_string()).collect()),
            create_calls: AtomicUsize::new(0),
            enable_calls: AtomicUsize::new(0),
            disable_calls: AtomicUsize::new(0),
            captions_ids: Mutex::new(Vec::new()),
            disabled_ids: Mutex::new(Vec::new()),
            fail_create: AtomicBool::new(false),
            create_delay: None,
        }
    }

    /// Make `create_session` take a while, so concurrent callers
    /// genuinely overlap with the in-flight creation.
    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn enable_calls(&self) -> usize {
        self.enable_calls.load(Ordering::SeqCst)
    }

    pub fn disable_calls(&self) -> usize {
        self.disable_calls.load(Ordering::SeqCst)
    }

    pub fn set_fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn last_captions_id(&self) -> Option<String> {
        self.captions_ids.lock().unwrap().last().cloned()
    }

    pub fn disabled_ids(&self) -> Vec<String> {
        self.disabled_ids.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoPlatform for MockPlatform {
    async fn create_session(&self) -> CoreResult<String> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.create_delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_create.load(Ordering::SeqCst) {
            return Err(CoreError::Transient("platform unavailable".to_string()));
        }

        let scripted = self.session_ids.lock().unwrap().pop_front();
        Ok(scripted.unwrap_or_else(|| format!("session-{}", Uuid::new_v4())))
    }

    async fn issue_token(&self, session_id: &str, role: Role) -> CoreResult<String> {
        Ok(format!("token-{}-{}", session_id, role))
    }

    async fn start_recording(&self, session_id: &str, _room_name: &str) -> CoreResult<String> {
        Ok(format!("rec-{}", session_id))
    }

    async fn stop_recording(&self, recording_id: &str) -> CoreResult<String> {
        Ok(recording_id.to_string())
    }

    async fn list_recordings(&self, _session_id: &str) -> CoreResult<Vec<String>> {
        Ok(Vec::new())
    }

    async fn enable_captions(&self, _session_id: &str) -> CoreResult<String> {
        self.enable_calls.fetch_add(1, Ordering::SeqCst);
        let id = Uuid::new_v4().to_string();
        self.captions_ids.lock().unwrap().push(id.clone());
        Ok(id)
    }

    async fn disable_captions(&self, captions_id: &str) -> CoreResult<String> {
        self.disable_calls.fetch_add(1, Ordering::SeqCst);
        self.disabled_ids
            .lock()
            .unwrap()
            .push(captions_id.to_string());
        Ok("stopped".to_string())
    }
}

#[derive(Default)]
pub struct MockBroadcast {
    sent: Mutex<Vec<(String, CaptionsSignal)>>,
}

impl MockBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<(String, CaptionsSignal)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl SignalBroadcast for MockBroadcast {
    async fn send_to_room(&self, session_id: &str, signal: &CaptionsSignal) -> CoreResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((session_id.to_string(), signal.clone()));
        Ok(())
    }
}
