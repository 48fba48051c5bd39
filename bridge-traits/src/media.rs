//! Media Element Abstraction
//!
//! One [`MediaElement`] backs one audio session. The browser implementation
//! wraps `HTMLAudioElement`; native hosts can provide anything that honours
//! the same readiness and event contract.
//!
//! ## Event contract
//!
//! Elements report asynchronous progress through a single listener installed
//! with [`MediaElement::set_listener`]. Implementations must:
//!
//! - emit [`MediaEvent::CanPlay`] once enough data is buffered to start,
//! - emit [`MediaEvent::Ended`] when playback reaches the end,
//! - emit [`MediaEvent::Error`] with the element's error code on failure,
//! - stop calling a listener once it has been replaced or cleared.

use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// `HTMLMediaElement.readyState` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    pub fn from_code(code: u16) -> Self {
        match code {
            0 => ReadyState::HaveNothing,
            1 => ReadyState::HaveMetadata,
            2 => ReadyState::HaveCurrentData,
            3 => ReadyState::HaveFutureData,
            _ => ReadyState::HaveEnoughData,
        }
    }

    /// Current frame is available, so `play()` can start without waiting.
    pub fn can_play(&self) -> bool {
        *self >= ReadyState::HaveCurrentData
    }
}

/// `MediaError.code` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaErrorCode {
    Aborted,
    Network,
    Decode,
    SrcNotSupported,
    Unknown,
}

impl MediaErrorCode {
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => MediaErrorCode::Aborted,
            2 => MediaErrorCode::Network,
            3 => MediaErrorCode::Decode,
            4 => MediaErrorCode::SrcNotSupported,
            _ => MediaErrorCode::Unknown,
        }
    }
}

impl fmt::Display for MediaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MediaErrorCode::Aborted => "loading aborted",
            MediaErrorCode::Network => "network error",
            MediaErrorCode::Decode => "decode error",
            MediaErrorCode::SrcNotSupported => "format not supported",
            MediaErrorCode::Unknown => "unknown media error",
        };
        f.write_str(text)
    }
}

/// Events emitted by a [`MediaElement`].
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadStart,
    CanPlay,
    CanPlayThrough,
    Playing,
    Paused,
    Ended,
    Waiting,
    Stalled,
    TimeUpdate(f64),
    Error(MediaErrorCode),
}

/// Reasons a `play()` request can be refused by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayRejection {
    /// Autoplay policy requires a user gesture.
    NotAllowed,
    NotSupported,
    /// Interrupted by a new load or pause.
    Aborted,
    Other(String),
}

impl fmt::Display for PlayRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayRejection::NotAllowed => f.write_str("playback requires a user interaction"),
            PlayRejection::NotSupported => f.write_str("audio format not supported"),
            PlayRejection::Aborted => f.write_str("playback was aborted"),
            PlayRejection::Other(message) => write!(f, "playback failed: {}", message),
        }
    }
}

/// Callback installed on a [`MediaElement`].
#[cfg(not(target_arch = "wasm32"))]
pub type MediaListener = Arc<dyn Fn(MediaEvent) + Send + Sync>;

#[cfg(target_arch = "wasm32")]
pub type MediaListener = Arc<dyn Fn(MediaEvent)>;

/// A single playable resource.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaElement: PlatformSendSync {
    /// Point the element at `url` and begin loading.
    fn set_source(&self, url: &str);

    /// The currently assigned source, if any.
    fn source(&self) -> Option<String>;

    /// Drop the current source and release buffered data.
    fn clear_source(&self);

    fn ready_state(&self) -> ReadyState;

    /// Start playback. Resolves once the host accepted the request.
    async fn play(&self) -> std::result::Result<(), PlayRejection>;

    fn pause(&self);

    fn current_time(&self) -> f64;

    fn set_current_time(&self, seconds: f64);

    /// Duration in seconds, `None` until metadata is known.
    fn duration(&self) -> Option<f64>;

    fn volume(&self) -> f64;

    fn set_volume(&self, volume: f64);

    fn muted(&self) -> bool;

    fn set_muted(&self, muted: bool);

    /// Last error reported by the element.
    fn error_code(&self) -> Option<MediaErrorCode>;

    /// Install (or clear with `None`) the event listener.
    fn set_listener(&self, listener: Option<MediaListener>);
}

/// Factory and prefetcher for media resources.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaBackend: PlatformSendSync {
    /// Create a fresh element with no source.
    fn create_element(&self) -> Arc<dyn MediaElement>;

    /// Warm the host cache for `url`. Resolves when the resource is fully
    /// buffered or fails.
    async fn prefetch(&self, url: &str) -> Result<()>;

    /// Whether the host can decode the given MIME type.
    fn can_play_type(&self, _mime: &str) -> bool {
        true
    }
}
