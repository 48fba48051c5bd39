//! Audio session and manager behaviour against an in-memory media backend.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::media::{
    MediaBackend, MediaElement, MediaErrorCode, MediaEvent, MediaListener, PlayRejection,
    ReadyState,
};
use bridge_traits::time::ManualClock;
use core_playback::{
    LazyLoader, MediaErrorKind, PathResolver, PerformanceMonitor, PlaybackError, SessionContext,
    SessionManager, SessionState, ShortcutCommand, StatusText,
};
use core_runtime::config::BasePathRules;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Fakes
// ============================================================================

#[derive(Default)]
struct ElementState {
    source: Option<String>,
    ready: Option<ReadyState>,
    time: f64,
    volume: f64,
    muted: bool,
    error: Option<MediaErrorCode>,
}

struct FakeElement {
    auto_ready: AtomicBool,
    fail_with: Mutex<Option<MediaErrorCode>>,
    reject_with: Mutex<Option<PlayRejection>>,
    plays: AtomicUsize,
    state: Mutex<ElementState>,
    listener: Mutex<Option<MediaListener>>,
}

impl FakeElement {
    fn new(auto_ready: bool) -> Self {
        Self {
            auto_ready: AtomicBool::new(auto_ready),
            fail_with: Mutex::new(None),
            reject_with: Mutex::new(None),
            plays: AtomicUsize::new(0),
            state: Mutex::new(ElementState {
                volume: 1.0,
                ..ElementState::default()
            }),
            listener: Mutex::new(None),
        }
    }

    fn fire(&self, event: MediaEvent) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }

    fn has_listener(&self) -> bool {
        self.listener.lock().is_some()
    }
}

#[async_trait]
impl MediaElement for FakeElement {
    fn set_source(&self, url: &str) {
        {
            let mut state = self.state.lock();
            state.source = Some(url.to_string());
            state.ready = None;
            state.error = None;
        }
        let failure = *self.fail_with.lock();
        if let Some(code) = failure {
            self.state.lock().error = Some(code);
            self.fire(MediaEvent::Error(code));
        } else if self.auto_ready.load(Ordering::SeqCst) {
            self.state.lock().ready = Some(ReadyState::HaveEnoughData);
            self.fire(MediaEvent::CanPlay);
        }
    }

    fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    fn clear_source(&self) {
        let mut state = self.state.lock();
        state.source = None;
        state.ready = None;
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready.unwrap_or(ReadyState::HaveNothing)
    }

    async fn play(&self) -> Result<(), PlayRejection> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        let rejection = self.reject_with.lock().clone();
        match rejection {
            Some(rejection) => Err(rejection),
            None => Ok(()),
        }
    }

    fn pause(&self) {}

    fn current_time(&self) -> f64 {
        self.state.lock().time
    }

    fn set_current_time(&self, seconds: f64) {
        self.state.lock().time = seconds;
    }

    fn duration(&self) -> Option<f64> {
        Some(30.0)
    }

    fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().volume = volume;
    }

    fn muted(&self) -> bool {
        self.state.lock().muted
    }

    fn set_muted(&self, muted: bool) {
        self.state.lock().muted = muted;
    }

    fn error_code(&self) -> Option<MediaErrorCode> {
        self.state.lock().error
    }

    fn set_listener(&self, listener: Option<MediaListener>) {
        *self.listener.lock() = listener;
    }
}

struct FakeBackend {
    auto_ready: bool,
    elements: Mutex<Vec<Arc<FakeElement>>>,
    unreachable: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn new(auto_ready: bool) -> Arc<Self> {
        Arc::new(Self {
            auto_ready,
            elements: Mutex::new(Vec::new()),
            unreachable: Mutex::new(Vec::new()),
        })
    }

    fn element(&self, index: usize) -> Arc<FakeElement> {
        Arc::clone(&self.elements.lock()[index])
    }
}

#[async_trait]
impl MediaBackend for FakeBackend {
    fn create_element(&self) -> Arc<dyn MediaElement> {
        let element = Arc::new(FakeElement::new(self.auto_ready));
        self.elements.lock().push(Arc::clone(&element));
        element
    }

    async fn prefetch(&self, url: &str) -> BridgeResult<()> {
        if self.unreachable.lock().iter().any(|u| u == url) {
            return Err(BridgeError::Network(format!("{} unreachable", url)));
        }
        Ok(())
    }
}

fn manager_with(backend: Arc<FakeBackend>, events: Option<EventBus>) -> SessionManager {
    let ctx = SessionContext {
        resolver: Arc::new(PathResolver::new(BasePathRules::default(), "Sound")),
        loader: Arc::new(LazyLoader::new(backend.clone(), 3, Duration::from_secs(10))),
        monitor: Arc::new(PerformanceMonitor::new(Arc::new(ManualClock::default()))),
        ready_timeout: Duration::from_secs(5),
        events,
    };
    SessionManager::new(backend, ctx)
}

// ============================================================================
// Tests
// ============================================================================

#[core_async::test]
async fn new_session_starts_stopped() {
    let manager = manager_with(FakeBackend::new(true), None);
    let session = manager.create_session("part-a-Class01-1", "Sound/Class01/a_1.opus");

    let snapshot = session.snapshot();
    assert_eq!(snapshot.state, SessionState::Stopped);
    assert_eq!(snapshot.status, StatusText::ClickToPlay);
    assert!(snapshot.error.is_none());
}

#[core_async::test]
async fn play_sets_resolved_source_and_records_latency() {
    let backend = FakeBackend::new(true);
    let manager = manager_with(backend.clone(), None);
    let session = manager.create_session("part-a-Class01-1", "Sound/Class01/a_1.opus");

    session.play().await.unwrap();

    assert_eq!(session.state(), SessionState::Playing);
    let source = backend.element(0).source().unwrap();
    assert!(source.ends_with("Sound/Class01/a_1.opus"));
    assert!(manager.loader().is_loaded(&source));
    assert_eq!(manager.monitor().report().total_audio_loads, 1);
}

#[core_async::test]
async fn second_play_stops_the_first() {
    let manager = manager_with(FakeBackend::new(true), None);
    let first = manager.create_session("part-a-Class01-1", "Sound/Class01/a_1.opus");
    let second = manager.create_session("part-b-Class01-1", "Sound/Class01/b_1.opus");

    first.play().await.unwrap();
    second.play().await.unwrap();

    assert_eq!(first.state(), SessionState::Stopped);
    assert_eq!(second.state(), SessionState::Playing);
    assert_eq!(manager.stats().playing, 1);
}

#[core_async::test]
async fn at_most_one_session_active_after_any_sequence() {
    let manager = manager_with(FakeBackend::new(true), None);
    let ids = ["s1", "s2", "s3"];
    for id in ids {
        manager.create_session(id, &format!("Sound/Class01/{}.opus", id));
    }

    for id in ["s1", "s2", "s1", "s3", "s2"] {
        manager.play(id).await.unwrap();
        manager.session(id).unwrap().pause().unwrap();
        let active = manager
            .sessions()
            .iter()
            .filter(|s| s.state().is_active())
            .count();
        assert!(active <= 1);
    }
}

#[core_async::test]
async fn pause_then_play_resumes_without_reload() {
    let backend = FakeBackend::new(true);
    let manager = manager_with(backend.clone(), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");

    session.play().await.unwrap();
    session.pause().unwrap();
    assert_eq!(session.state(), SessionState::Paused);
    assert_eq!(session.snapshot().status, StatusText::Paused);

    session.play().await.unwrap();
    assert_eq!(session.state(), SessionState::Playing);
    assert_eq!(backend.element(0).plays.load(Ordering::SeqCst), 2);
}

#[core_async::test]
async fn illegal_triggers_leave_state_unchanged() {
    let manager = manager_with(FakeBackend::new(true), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");

    let err = session.pause().unwrap_err();
    assert!(matches!(err, PlaybackError::InvalidTransition { .. }));
    assert_eq!(session.state(), SessionState::Stopped);

    session.play().await.unwrap();
    assert!(session.play().await.is_err());
    assert_eq!(session.state(), SessionState::Playing);
}

#[core_async::test]
async fn ended_event_returns_to_stopped() {
    let backend = FakeBackend::new(true);
    let bus = EventBus::new(32);
    let mut events = bus.subscribe();
    let manager = manager_with(backend.clone(), Some(bus));
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");

    session.play().await.unwrap();
    backend.element(0).fire(MediaEvent::Ended);

    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(session.snapshot().status, StatusText::Finished);

    let mut finished = false;
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Playback(PlaybackEvent::Finished { audio_id }) = event {
            finished |= audio_id == "s1";
        }
    }
    assert!(finished);
}

#[core_async::test(start_paused = true)]
async fn ready_timeout_requires_retry() {
    let backend = FakeBackend::new(false);
    let manager = manager_with(backend.clone(), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");

    let err = session.play().await.unwrap_err();
    assert!(matches!(err, PlaybackError::ReadyTimeout(_)));
    assert_eq!(session.state(), SessionState::Error);
    assert_eq!(session.error().unwrap().kind, MediaErrorKind::Timeout);

    assert!(matches!(
        session.play().await,
        Err(PlaybackError::RetryRequired(_))
    ));

    // A late ready event after the timeout is ignored.
    backend.element(0).fire(MediaEvent::CanPlay);
    assert_eq!(session.state(), SessionState::Error);

    backend.element(0).auto_ready.store(true, Ordering::SeqCst);
    session.retry().await.unwrap();
    assert_eq!(session.state(), SessionState::Playing);
    assert!(session.error().is_none());
}

#[core_async::test]
async fn format_error_is_classified() {
    let backend = FakeBackend::new(true);
    let manager = manager_with(backend.clone(), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");
    *backend.element(0).fail_with.lock() = Some(MediaErrorCode::SrcNotSupported);

    let err = session.play().await.unwrap_err();
    assert!(err.is_format_error());
    assert_eq!(session.error().unwrap().kind, MediaErrorKind::UnsupportedFormat);
    assert_eq!(manager.monitor().report().error_counts.audio_load, 1);
}

#[core_async::test]
async fn network_failure_offers_retry() {
    let backend = FakeBackend::new(true);
    backend
        .unreachable
        .lock()
        .push("./Sound/Class01/a_1.opus".to_string());
    let manager = manager_with(backend.clone(), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");

    let err = session.play().await.unwrap_err();
    assert!(err.is_network_error());
    assert!(session.error().unwrap().kind.offers_retry());

    backend.unreachable.lock().clear();
    manager.retry("s1").await.unwrap();
    assert_eq!(session.state(), SessionState::Playing);
}

#[core_async::test]
async fn autoplay_rejection_is_playback_blocked() {
    let backend = FakeBackend::new(true);
    let manager = manager_with(backend.clone(), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");
    *backend.element(0).reject_with.lock() = Some(PlayRejection::NotAllowed);

    session.play().await.unwrap_err();
    assert_eq!(session.error().unwrap().kind, MediaErrorKind::PlaybackBlocked);
}

#[core_async::test]
async fn stop_rewinds_and_is_always_allowed() {
    let backend = FakeBackend::new(true);
    let manager = manager_with(backend.clone(), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");

    session.stop().unwrap();
    assert_eq!(session.state(), SessionState::Stopped);

    session.play().await.unwrap();
    backend.element(0).set_current_time(12.0);
    session.stop().unwrap();
    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(backend.element(0).current_time(), 0.0);
    assert_eq!(session.snapshot().status, StatusText::Stopped);
}

#[core_async::test]
async fn destroy_is_idempotent_and_detaches() {
    let backend = FakeBackend::new(true);
    let manager = manager_with(backend.clone(), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");

    assert!(manager.destroy_session("s1"));
    assert!(!manager.destroy_session("s1"));
    session.destroy();

    assert!(session.is_destroyed());
    assert!(!backend.element(0).has_listener());
    assert!(matches!(session.play().await, Err(PlaybackError::Destroyed(_))));
    assert!(manager.is_empty());
}

#[core_async::test]
async fn create_with_existing_id_replaces() {
    let backend = FakeBackend::new(true);
    let manager = manager_with(backend.clone(), None);
    let old = manager.create_session("s1", "Sound/Class01/a_1.opus");
    let new = manager.create_session("s1", "Sound/Class01/a_1.opus");

    assert!(old.is_destroyed());
    assert!(!new.is_destroyed());
    assert_eq!(manager.len(), 1);
}

#[core_async::test]
async fn extra_controls_clamp() {
    let manager = manager_with(FakeBackend::new(true), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");
    session.play().await.unwrap();

    assert_eq!(session.seek_by(-5.0).unwrap(), 0.0);
    assert_eq!(session.seek_by(40.0).unwrap(), 30.0);
    assert_eq!(session.seek_to_ratio(0.5).unwrap(), 15.0);
    assert!((session.progress() - 0.5).abs() < 1e-9);

    assert_eq!(session.set_volume(1.7).unwrap(), 1.0);
    let lowered = session.adjust_volume(-1).unwrap();
    assert!((lowered - 0.9).abs() < 1e-9);
    assert!(session.toggle_mute().unwrap());
    assert!(session.snapshot().muted);
}

#[core_async::test]
async fn visibility_pauses_and_resumes() {
    let manager = manager_with(FakeBackend::new(true), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");
    session.play().await.unwrap();

    assert_eq!(manager.page_hidden(), 1);
    assert_eq!(session.state(), SessionState::Paused);

    assert_eq!(manager.page_visible().await, 1);
    assert_eq!(session.state(), SessionState::Playing);
    assert_eq!(manager.page_visible().await, 0);
}

#[core_async::test]
async fn shortcuts_drive_the_manager() {
    let manager = manager_with(FakeBackend::new(true), None);
    let session = manager.create_session("s1", "Sound/Class01/a_1.opus");

    let feedback = ShortcutCommand::TogglePlay.apply(&manager).await;
    assert_eq!(feedback.as_deref(), Some("▶️ 开始播放"));
    assert_eq!(session.state(), SessionState::Playing);

    let feedback = ShortcutCommand::VolumeDown.apply(&manager).await;
    assert_eq!(feedback.as_deref(), Some("🔉 音量: 90%"));

    let feedback = ShortcutCommand::StopAll.apply(&manager).await;
    assert_eq!(feedback.as_deref(), Some("⏹️ 已停止 1 个音频"));
    assert_eq!(session.state(), SessionState::Stopped);

    assert_eq!(ShortcutCommand::Restart.apply(&manager).await, None);
}
