//! Headless media backend.
//!
//! Elements track source, position and volume without producing sound. They
//! report ready as soon as a source is assigned; whether the file is actually
//! reachable is checked by [`HeadlessMediaBackend::prefetch`], which the
//! lazy loader always runs first.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    http::{HttpClient, HttpRequest},
    media::{
        MediaBackend, MediaElement, MediaErrorCode, MediaEvent, MediaListener, PlayRejection,
        ReadyState,
    },
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

const SUPPORTED_TYPES: &[&str] = &["audio/ogg", "audio/opus", "audio/mpeg", "audio/wav", "audio/mp4"];

pub struct HeadlessMediaBackend {
    http: Arc<dyn HttpClient>,
}

impl HeadlessMediaBackend {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl MediaBackend for HeadlessMediaBackend {
    fn create_element(&self) -> Arc<dyn MediaElement> {
        Arc::new(HeadlessElement::default())
    }

    async fn prefetch(&self, url: &str) -> Result<()> {
        let response = self.http.execute(HttpRequest::get(url)).await?;
        let response = response.error_for_status(url)?;
        if response.body.is_empty() {
            return Err(BridgeError::Media(format!("empty audio file: {}", url)));
        }
        debug!(url, bytes = response.body.len(), "Prefetched audio");
        Ok(())
    }

    fn can_play_type(&self, mime: &str) -> bool {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        SUPPORTED_TYPES.contains(&essence)
    }
}

impl std::fmt::Debug for HeadlessMediaBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeadlessMediaBackend").finish_non_exhaustive()
    }
}

// =============================================================================
// Element
// =============================================================================

struct ElementState {
    source: Option<String>,
    ready: ReadyState,
    paused: bool,
    position: f64,
    duration: Option<f64>,
    volume: f64,
    muted: bool,
    error: Option<MediaErrorCode>,
}

impl Default for ElementState {
    fn default() -> Self {
        Self {
            source: None,
            ready: ReadyState::HaveNothing,
            paused: true,
            position: 0.0,
            duration: None,
            volume: 1.0,
            muted: false,
            error: None,
        }
    }
}

#[derive(Default)]
pub struct HeadlessElement {
    state: Mutex<ElementState>,
    listener: Mutex<Option<MediaListener>>,
}

impl HeadlessElement {
    fn fire(&self, event: MediaEvent) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(event);
        }
    }

    /// Set the known duration, as decoded metadata would.
    pub fn set_duration(&self, seconds: Option<f64>) {
        self.state.lock().duration = seconds;
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    /// Jump to the end and report `Ended`.
    pub fn finish(&self) {
        {
            let mut state = self.state.lock();
            state.paused = true;
            if let Some(duration) = state.duration {
                state.position = duration;
            }
        }
        self.fire(MediaEvent::Ended);
    }
}

#[async_trait]
impl MediaElement for HeadlessElement {
    fn set_source(&self, url: &str) {
        {
            let mut state = self.state.lock();
            let (volume, muted) = (state.volume, state.muted);
            *state = ElementState {
                source: Some(url.to_string()),
                ready: ReadyState::HaveEnoughData,
                volume,
                muted,
                ..ElementState::default()
            };
        }
        self.fire(MediaEvent::LoadStart);
        self.fire(MediaEvent::CanPlay);
    }

    fn source(&self) -> Option<String> {
        self.state.lock().source.clone()
    }

    fn clear_source(&self) {
        let mut state = self.state.lock();
        state.source = None;
        state.ready = ReadyState::HaveNothing;
        state.paused = true;
        state.position = 0.0;
    }

    fn ready_state(&self) -> ReadyState {
        self.state.lock().ready
    }

    async fn play(&self) -> std::result::Result<(), PlayRejection> {
        let started = {
            let mut state = self.state.lock();
            if state.source.is_none() {
                false
            } else {
                state.paused = false;
                true
            }
        };
        if !started {
            return Err(PlayRejection::Aborted);
        }
        self.fire(MediaEvent::Playing);
        Ok(())
    }

    fn pause(&self) {
        let was_playing = {
            let mut state = self.state.lock();
            std::mem::replace(&mut state.paused, true)
        };
        if !was_playing {
            self.fire(MediaEvent::Paused);
        }
    }

    fn current_time(&self) -> f64 {
        self.state.lock().position
    }

    fn set_current_time(&self, seconds: f64) {
        let mut state = self.state.lock();
        let upper = state.duration.unwrap_or(f64::MAX);
        state.position = seconds.clamp(0.0, upper);
    }

    fn duration(&self) -> Option<f64> {
        self.state.lock().duration
    }

    fn volume(&self) -> f64 {
        self.state.lock().volume
    }

    fn set_volume(&self, volume: f64) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
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
