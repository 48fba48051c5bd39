//! # Audio Session
//!
//! One session per rendered paragraph with audio. A session owns exactly one
//! [`MediaElement`] and drives it through a small state machine:
//!
//! ```text
//! stopped --play--> loading --ready--> playing --pause--> paused --play--> playing
//! loading --fail--> error --retry--> loading
//! playing --ended--> stopped
//! loading/playing/paused --stop--> stopped
//! ```
//!
//! Every state change goes through [`next_state`]; a trigger it rejects
//! leaves the session untouched and surfaces as
//! [`PlaybackError::InvalidTransition`].
//!
//! ## Cancellation
//!
//! Each load attempt carries a generation number. `stop()`, `destroy()` and
//! newer attempts bump it, so results that arrive late (a prefetch finishing
//! after a stop, a ready event after the timeout) are discarded.

use bridge_traits::media::{MediaElement, MediaErrorCode, MediaEvent};
use bridge_traits::platform::PlatformSendSync;
use core_async::sync::oneshot;
use core_async::time::{timeout, Duration, Instant};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tracing::{debug, info, instrument, warn};

use crate::error::{MediaErrorKind, PlaybackError, Result};
use crate::loader::LazyLoader;
use crate::metrics::{ErrorCategory, PerformanceMonitor};
use crate::path::PathResolver;

const VOLUME_STEP: f64 = 0.1;

// =============================================================================
// State machine
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Stopped,
    Loading,
    Playing,
    Paused,
    Error,
}

impl SessionState {
    /// Playing or paused; at most one session is active at a time.
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Playing | SessionState::Paused)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionTrigger {
    Play,
    Ready,
    Pause,
    Resume,
    Stop,
    Ended,
    Fail,
    Retry,
}

/// Transition table. `None` means the trigger is illegal in `state`.
pub fn next_state(state: SessionState, trigger: SessionTrigger) -> Option<SessionState> {
    use SessionState as S;
    use SessionTrigger as T;

    match (state, trigger) {
        (S::Stopped, T::Play) => Some(S::Loading),
        (S::Stopped, T::Stop) => Some(S::Stopped),
        (S::Stopped, T::Ready | T::Pause | T::Resume | T::Ended | T::Fail | T::Retry) => None,

        (S::Loading, T::Ready) => Some(S::Playing),
        (S::Loading, T::Fail) => Some(S::Error),
        (S::Loading, T::Stop) => Some(S::Stopped),
        (S::Loading, T::Play | T::Pause | T::Resume | T::Ended | T::Retry) => None,

        (S::Playing, T::Pause) => Some(S::Paused),
        (S::Playing, T::Ended | T::Stop) => Some(S::Stopped),
        (S::Playing, T::Fail) => Some(S::Error),
        (S::Playing, T::Play | T::Ready | T::Resume | T::Retry) => None,

        (S::Paused, T::Resume) => Some(S::Playing),
        (S::Paused, T::Stop) => Some(S::Stopped),
        (S::Paused, T::Fail) => Some(S::Error),
        (S::Paused, T::Play | T::Ready | T::Pause | T::Ended | T::Retry) => None,

        (S::Error, T::Retry) => Some(S::Loading),
        // Stop resets the element but the failure stays until retry.
        (S::Error, T::Stop) => Some(S::Error),
        (S::Error, T::Play | T::Ready | T::Pause | T::Resume | T::Ended | T::Fail) => None,
    }
}

// =============================================================================
// Status text
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusText {
    ClickToPlay,
    Ready,
    Loading,
    Playing,
    Paused,
    Finished,
    Stopped,
    Stalled,
    Buffering,
    Retrying,
    Error(String),
}

impl StatusText {
    pub fn text(&self) -> String {
        match self {
            StatusText::ClickToPlay => "点击播放".to_string(),
            StatusText::Ready => "准备就绪".to_string(),
            StatusText::Loading => "正在加载...".to_string(),
            StatusText::Playing => "播放中".to_string(),
            StatusText::Paused => "已暂停".to_string(),
            StatusText::Finished => "播放完成".to_string(),
            StatusText::Stopped => "已停止".to_string(),
            StatusText::Stalled => "网络缓慢，正在缓冲...".to_string(),
            StatusText::Buffering => "正在缓冲...".to_string(),
            StatusText::Retrying => "正在重试...".to_string(),
            StatusText::Error(message) => format!("错误: {}", message),
        }
    }
}

/// Failure recorded on a session in [`SessionState::Error`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionError {
    pub kind: MediaErrorKind,
    pub message: String,
}

impl From<&PlaybackError> for SessionError {
    fn from(error: &PlaybackError) -> Self {
        Self {
            kind: error.kind(),
            message: error.user_message(),
        }
    }
}

/// Point-in-time view of a session for rendering controls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub audio_id: String,
    pub state: SessionState,
    pub loading: bool,
    pub error: Option<SessionError>,
    pub status: StatusText,
    pub current_time: f64,
    pub duration: Option<f64>,
    pub volume: f64,
    pub muted: bool,
}

// =============================================================================
// Session
// =============================================================================

/// Stops competing sessions before one starts playing.
pub trait PlaybackCoordinator: PlatformSendSync {
    /// Stop every playing or paused session except `except`. Returns how many
    /// were stopped.
    fn stop_others(&self, except: &str) -> usize;
}

/// Collaborators shared by every session.
#[derive(Clone)]
pub struct SessionContext {
    pub resolver: Arc<PathResolver>,
    pub loader: Arc<LazyLoader>,
    pub monitor: Arc<PerformanceMonitor>,
    pub ready_timeout: Duration,
    pub events: Option<EventBus>,
}

type ReadySender = oneshot::Sender<std::result::Result<(), MediaErrorCode>>;

struct Inner {
    state: SessionState,
    loading: bool,
    error: Option<SessionError>,
    status: StatusText,
    generation: u64,
    ready_tx: Option<ReadySender>,
}

pub struct AudioSession {
    id: String,
    audio_file: String,
    ctx: SessionContext,
    element: Mutex<Option<Arc<dyn MediaElement>>>,
    coordinator: Mutex<Option<Weak<dyn PlaybackCoordinator>>>,
    inner: Mutex<Inner>,
}

impl AudioSession {
    pub fn new(
        id: impl Into<String>,
        audio_file: impl Into<String>,
        element: Arc<dyn MediaElement>,
        ctx: SessionContext,
    ) -> Arc<Self> {
        let session = Arc::new_cyclic(|weak: &Weak<AudioSession>| {
            let listener_target = weak.clone();
            element.set_listener(Some(Arc::new(move |event: MediaEvent| {
                if let Some(session) = listener_target.upgrade() {
                    session.on_media_event(event);
                }
            })));

            AudioSession {
                id: id.into(),
                audio_file: audio_file.into(),
                ctx,
                element: Mutex::new(Some(element)),
                coordinator: Mutex::new(None),
                inner: Mutex::new(Inner {
                    state: SessionState::Stopped,
                    loading: false,
                    error: None,
                    status: StatusText::ClickToPlay,
                    generation: 0,
                    ready_tx: None,
                }),
            }
        });
        debug!(audio_id = %session.id, "Audio session created");
        session
    }

    pub(crate) fn set_coordinator(&self, coordinator: Weak<dyn PlaybackCoordinator>) {
        *self.coordinator.lock() = Some(coordinator);
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn audio_file(&self) -> &str {
        &self.audio_file
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    pub fn error(&self) -> Option<SessionError> {
        self.inner.lock().error.clone()
    }

    pub fn is_destroyed(&self) -> bool {
        self.element.lock().is_none()
    }

    fn element(&self) -> Result<Arc<dyn MediaElement>> {
        self.element
            .lock()
            .clone()
            .ok_or_else(|| PlaybackError::Destroyed(self.id.clone()))
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(events) = &self.ctx.events {
            let _ = events.emit(CoreEvent::Playback(event));
        }
    }

    fn stop_others(&self) {
        let coordinator = self.coordinator.lock().as_ref().and_then(Weak::upgrade);
        if let Some(coordinator) = coordinator {
            let stopped = coordinator.stop_others(&self.id);
            if stopped > 0 {
                debug!(audio_id = %self.id, stopped, "Stopped other sessions");
            }
        }
    }

    // =========================================================================
    // Transport
    // =========================================================================

    /// Start playback, or resume when paused.
    ///
    /// Refused with [`PlaybackError::RetryRequired`] while in error.
    #[instrument(skip(self), fields(audio_id = %self.id))]
    pub async fn play(&self) -> Result<()> {
        let element = self.element()?;
        let resume = {
            let inner = self.inner.lock();
            match inner.state {
                SessionState::Stopped => false,
                SessionState::Paused => true,
                SessionState::Error => return Err(PlaybackError::RetryRequired(self.id.clone())),
                state => {
                    return Err(PlaybackError::InvalidTransition {
                        state,
                        trigger: SessionTrigger::Play,
                    })
                }
            }
        };

        self.stop_others();

        if resume {
            self.resume(element).await
        } else {
            self.load_and_play(element, SessionTrigger::Play).await
        }
    }

    async fn resume(&self, element: Arc<dyn MediaElement>) -> Result<()> {
        let generation = self.inner.lock().generation;
        if let Err(rejection) = element.play().await {
            return Err(self.fail(generation, PlaybackError::Rejected(rejection)));
        }

        {
            let mut inner = self.inner.lock();
            if inner.generation != generation || inner.state != SessionState::Paused {
                return Err(PlaybackError::Cancelled);
            }
            inner.state = SessionState::Playing;
            inner.status = StatusText::Playing;
        }
        self.emit(PlaybackEvent::Started {
            audio_id: self.id.clone(),
        });
        Ok(())
    }

    async fn load_and_play(
        &self,
        element: Arc<dyn MediaElement>,
        trigger: SessionTrigger,
    ) -> Result<()> {
        let generation = {
            let mut inner = self.inner.lock();
            let next = next_state(inner.state, trigger).ok_or(PlaybackError::InvalidTransition {
                state: inner.state,
                trigger,
            })?;
            inner.state = next;
            inner.generation += 1;
            inner.loading = true;
            inner.error = None;
            inner.status = StatusText::Loading;
            inner.generation
        };
        self.emit(PlaybackEvent::Loading {
            audio_id: self.id.clone(),
        });

        let started = Instant::now();
        let url = match self.load_ready(&element, generation).await {
            Ok(url) => url,
            Err(e) => return Err(self.fail(generation, e)),
        };

        {
            let mut inner = self.inner.lock();
            let current = inner.generation == generation;
            match next_state(inner.state, SessionTrigger::Ready) {
                Some(next) if current => {
                    inner.state = next;
                    inner.loading = false;
                    inner.status = StatusText::Playing;
                }
                _ => {
                    drop(inner);
                    element.pause();
                    return Err(PlaybackError::Cancelled);
                }
            }
        }

        self.ctx.monitor.record_audio_load(&url, started.elapsed());
        info!(audio_id = %self.id, url = %url, "Playback started");
        self.emit(PlaybackEvent::Started {
            audio_id: self.id.clone(),
        });
        Ok(())
    }

    async fn load_ready(&self, element: &Arc<dyn MediaElement>, generation: u64) -> Result<String> {
        let url = self.ctx.resolver.resolve(&self.audio_file)?;
        debug!(audio_id = %self.id, file = %self.audio_file, url = %url, "Resolved audio path");

        self.ctx.loader.load(&url).await?;
        self.ensure_current(generation)?;

        if !source_matches(element.source().as_deref(), &url) {
            element.set_source(&url);
        }

        self.wait_ready(element, generation).await?;
        element.play().await.map_err(PlaybackError::Rejected)?;
        Ok(url)
    }

    fn ensure_current(&self, generation: u64) -> Result<()> {
        if self.inner.lock().generation == generation {
            Ok(())
        } else {
            Err(PlaybackError::Cancelled)
        }
    }

    async fn wait_ready(&self, element: &Arc<dyn MediaElement>, generation: u64) -> Result<()> {
        if element.ready_state().can_play() {
            return Ok(());
        }
        if let Some(code) = element.error_code() {
            return Err(PlaybackError::Media(code));
        }

        let rx = {
            let mut inner = self.inner.lock();
            if inner.generation != generation {
                return Err(PlaybackError::Cancelled);
            }
            let (tx, rx) = oneshot::channel();
            inner.ready_tx = Some(tx);
            rx
        };

        // Readiness may have arrived before the sender was installed.
        if element.ready_state().can_play() {
            self.inner.lock().ready_tx = None;
            return Ok(());
        }

        match timeout(self.ctx.ready_timeout, rx).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(code))) => Err(PlaybackError::Media(code)),
            Ok(Err(_)) => Err(PlaybackError::Cancelled),
            Err(_) => {
                let mut inner = self.inner.lock();
                if inner.generation == generation {
                    inner.ready_tx = None;
                }
                Err(PlaybackError::ReadyTimeout(self.ctx.ready_timeout))
            }
        }
    }

    /// Move to `Error` if `generation` is still current. Stale failures come
    /// back as [`PlaybackError::Cancelled`].
    fn fail(&self, generation: u64, error: PlaybackError) -> PlaybackError {
        if matches!(error, PlaybackError::Cancelled) {
            return error;
        }

        let applied = {
            let mut inner = self.inner.lock();
            let next = next_state(inner.state, SessionTrigger::Fail);
            match next {
                Some(next) if inner.generation == generation => {
                    let recorded = SessionError::from(&error);
                    inner.state = next;
                    inner.loading = false;
                    inner.ready_tx = None;
                    inner.status = StatusText::Error(recorded.message.clone());
                    inner.error = Some(recorded);
                    true
                }
                _ => false,
            }
        };

        if !applied {
            debug!(audio_id = %self.id, error = %error, "Ignoring stale failure");
            return PlaybackError::Cancelled;
        }

        warn!(audio_id = %self.id, error = %error, kind = ?error.kind(), "Playback failed");
        self.ctx.monitor.record_error(ErrorCategory::AudioLoad);
        if error.is_network_error() {
            self.ctx.monitor.record_error(ErrorCategory::Network);
        }
        self.emit(PlaybackEvent::Error {
            audio_id: self.id.clone(),
            message: error.user_message(),
            recoverable: error.kind().offers_retry(),
        });
        error
    }

    /// Pause a playing session.
    pub fn pause(&self) -> Result<()> {
        let element = self.element()?;
        {
            let mut inner = self.inner.lock();
            let next = next_state(inner.state, SessionTrigger::Pause).ok_or(
                PlaybackError::InvalidTransition {
                    state: inner.state,
                    trigger: SessionTrigger::Pause,
                },
            )?;
            inner.state = next;
            inner.status = StatusText::Paused;
        }
        element.pause();
        self.emit(PlaybackEvent::Paused {
            audio_id: self.id.clone(),
        });
        Ok(())
    }

    /// Pause, rewind and return to `Stopped`. Cancels a load in progress.
    pub fn stop(&self) -> Result<()> {
        let element = self.element()?;
        element.pause();
        element.set_current_time(0.0);

        let previous = {
            let mut inner = self.inner.lock();
            let previous = inner.state;
            // Stop is legal in every state.
            inner.state = next_state(previous, SessionTrigger::Stop).unwrap_or(previous);
            inner.generation += 1;
            inner.ready_tx = None;
            inner.loading = false;
            if inner.state == SessionState::Stopped {
                inner.status = StatusText::Stopped;
            }
            previous
        };

        if matches!(
            previous,
            SessionState::Loading | SessionState::Playing | SessionState::Paused
        ) {
            debug!(audio_id = %self.id, from = ?previous, "Session stopped");
            self.emit(PlaybackEvent::Stopped {
                audio_id: self.id.clone(),
            });
        }
        Ok(())
    }

    /// Clear the error, reload the source and play again.
    ///
    /// On a session that is not in error this is a plain [`play`](Self::play).
    #[instrument(skip(self), fields(audio_id = %self.id))]
    pub async fn retry(&self) -> Result<()> {
        let element = self.element()?;
        let in_error = {
            let mut inner = self.inner.lock();
            if inner.state == SessionState::Error {
                inner.error = None;
                inner.status = StatusText::Retrying;
                true
            } else {
                false
            }
        };
        if !in_error {
            return self.play().await;
        }

        info!(audio_id = %self.id, "Retrying playback");
        element.clear_source();
        self.stop_others();
        self.load_and_play(element, SessionTrigger::Retry).await
    }

    /// Release the element and detach callbacks. Safe to call repeatedly.
    pub fn destroy(&self) {
        let element = self.element.lock().take();
        {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            inner.ready_tx = None;
            inner.loading = false;
        }

        if let Some(element) = element {
            element.pause();
            element.set_listener(None);
            element.clear_source();
            debug!(audio_id = %self.id, "Audio session destroyed");
        }
    }

    // =========================================================================
    // Media events
    // =========================================================================

    fn on_media_event(&self, event: MediaEvent) {
        let mut emit = None;
        let mut failure = None;
        {
            let mut inner = self.inner.lock();
            match event {
                MediaEvent::LoadStart => {
                    if inner.state == SessionState::Loading {
                        inner.loading = true;
                    }
                }
                MediaEvent::CanPlay | MediaEvent::CanPlayThrough => {
                    if let Some(tx) = inner.ready_tx.take() {
                        let _ = tx.send(Ok(()));
                    }
                    if inner.state == SessionState::Loading {
                        inner.status = StatusText::Ready;
                    }
                }
                MediaEvent::Error(code) => {
                    if let Some(tx) = inner.ready_tx.take() {
                        let _ = tx.send(Err(code));
                    } else if inner.state.is_active() {
                        failure = Some((inner.generation, PlaybackError::Media(code)));
                    }
                }
                MediaEvent::Ended => {
                    if let Some(next) = next_state(inner.state, SessionTrigger::Ended) {
                        inner.state = next;
                        inner.status = StatusText::Finished;
                        emit = Some(PlaybackEvent::Finished {
                            audio_id: self.id.clone(),
                        });
                    }
                }
                MediaEvent::Stalled => {
                    if matches!(inner.state, SessionState::Loading | SessionState::Playing) {
                        inner.status = StatusText::Stalled;
                    }
                }
                MediaEvent::Waiting => {
                    if matches!(inner.state, SessionState::Loading | SessionState::Playing) {
                        inner.status = StatusText::Buffering;
                    }
                }
                MediaEvent::Playing => {
                    if inner.state == SessionState::Playing {
                        inner.status = StatusText::Playing;
                    }
                }
                MediaEvent::Paused | MediaEvent::TimeUpdate(_) => {}
            }
        }

        if let Some(event) = emit {
            self.emit(event);
        }
        if let Some((generation, error)) = failure {
            self.fail(generation, error);
        }
    }

    // =========================================================================
    // Position and volume
    // =========================================================================

    /// Move by `delta` seconds, clamped to `[0, duration]`.
    pub fn seek_by(&self, delta: f64) -> Result<f64> {
        let element = self.element()?;
        let current = element.current_time();
        let upper = element.duration().filter(|d| d.is_finite()).unwrap_or(current.max(0.0));
        let target = (current + delta).clamp(0.0, upper.max(0.0));
        element.set_current_time(target);
        Ok(target)
    }

    pub fn restart(&self) -> Result<()> {
        self.element()?.set_current_time(0.0);
        Ok(())
    }

    /// Playback position as a fraction of the duration, `0.0` when unknown.
    pub fn progress(&self) -> f64 {
        let Ok(element) = self.element() else {
            return 0.0;
        };
        match element.duration() {
            Some(duration) if duration.is_finite() && duration > 0.0 => {
                (element.current_time() / duration).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    /// Jump to `ratio` of the duration, e.g. from a progress bar click.
    pub fn seek_to_ratio(&self, ratio: f64) -> Result<f64> {
        let element = self.element()?;
        let Some(duration) = element.duration().filter(|d| d.is_finite() && *d > 0.0) else {
            return Ok(element.current_time());
        };
        let target = ratio.clamp(0.0, 1.0) * duration;
        element.set_current_time(target);
        Ok(target)
    }

    pub fn set_volume(&self, volume: f64) -> Result<f64> {
        let element = self.element()?;
        let volume = if volume.is_finite() { volume.clamp(0.0, 1.0) } else { 1.0 };
        element.set_volume(volume);
        Ok(volume)
    }

    /// Step the volume up (`steps > 0`) or down by 10% per step.
    pub fn adjust_volume(&self, steps: i32) -> Result<f64> {
        let current = self.element()?.volume();
        self.set_volume(current + f64::from(steps) * VOLUME_STEP)
    }

    /// Flip mute. Returns the new muted flag.
    pub fn toggle_mute(&self) -> Result<bool> {
        let element = self.element()?;
        let muted = !element.muted();
        element.set_muted(muted);
        Ok(muted)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let element = self.element.lock().clone();
        let current_time = element.as_ref().map_or(0.0, |e| e.current_time());
        let duration = element.as_ref().and_then(|e| e.duration());
        let volume = element.as_ref().map_or(1.0, |e| e.volume());
        let muted = element.as_ref().is_some_and(|e| e.muted());

        let inner = self.inner.lock();
        SessionSnapshot {
            audio_id: self.id.clone(),
            state: inner.state,
            loading: inner.loading,
            error: inner.error.clone(),
            status: inner.status.clone(),
            current_time,
            duration,
            volume,
            muted,
        }
    }
}

impl Drop for AudioSession {
    fn drop(&mut self) {
        if let Some(element) = self.element.get_mut().take() {
            element.set_listener(None);
        }
    }
}

impl std::fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSession")
            .field("id", &self.id)
            .field("audio_file", &self.audio_file)
            .field("state", &self.state())
            .finish()
    }
}

/// Hosts report absolute sources, so compare on the root-relative tail.
fn source_matches(current: Option<&str>, url: &str) -> bool {
    let Some(current) = current else {
        return false;
    };
    if current == url {
        return true;
    }
    let mut tail = url;
    loop {
        if let Some(rest) = tail.strip_prefix("./") {
            tail = rest;
        } else if let Some(rest) = tail.strip_prefix("../") {
            tail = rest;
        } else {
            break;
        }
    }
    !tail.is_empty() && current.ends_with(tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_transitions() {
        use SessionState as S;
        use SessionTrigger as T;

        assert_eq!(next_state(S::Stopped, T::Play), Some(S::Loading));
        assert_eq!(next_state(S::Loading, T::Ready), Some(S::Playing));
        assert_eq!(next_state(S::Playing, T::Pause), Some(S::Paused));
        assert_eq!(next_state(S::Paused, T::Resume), Some(S::Playing));
        assert_eq!(next_state(S::Loading, T::Fail), Some(S::Error));
        assert_eq!(next_state(S::Playing, T::Ended), Some(S::Stopped));
        assert_eq!(next_state(S::Paused, T::Stop), Some(S::Stopped));
        assert_eq!(next_state(S::Error, T::Retry), Some(S::Loading));
    }

    #[test]
    fn test_illegal_transitions() {
        use SessionState as S;
        use SessionTrigger as T;

        assert_eq!(next_state(S::Stopped, T::Pause), None);
        assert_eq!(next_state(S::Paused, T::Pause), None);
        assert_eq!(next_state(S::Error, T::Play), None);
        assert_eq!(next_state(S::Loading, T::Play), None);
        assert_eq!(next_state(S::Stopped, T::Ended), None);
    }

    #[test]
    fn test_status_texts() {
        assert_eq!(StatusText::ClickToPlay.text(), "点击播放");
        assert_eq!(StatusText::Stalled.text(), "网络缓慢，正在缓冲...");
        assert_eq!(StatusText::Error("音频准备超时".into()).text(), "错误: 音频准备超时");
    }

    #[test]
    fn test_source_matching() {
        assert!(source_matches(
            Some("http://localhost:8000/Sound/Class01/a_1.opus"),
            "./Sound/Class01/a_1.opus"
        ));
        assert!(source_matches(Some("../../Sound/x.opus"), "../../Sound/x.opus"));
        assert!(!source_matches(Some("http://h/Sound/b.opus"), "./Sound/a.opus"));
        assert!(!source_matches(None, "./Sound/a.opus"));
    }
}
