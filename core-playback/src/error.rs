//! # Playback Error Types
//!
//! Errors raised by the path resolver, the lazy loader and audio sessions,
//! plus the classification used to pick the right affordance in the
//! controls (retry button, permanent format notice, generic message).

use bridge_traits::error::BridgeError;
use bridge_traits::media::{MediaErrorCode, PlayRejection};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::path::PathError;
use crate::session::{SessionState, SessionTrigger};

/// Errors that can occur during playback operations.
#[derive(Error, Debug, Clone)]
pub enum PlaybackError {
    // ========================================================================
    // Source Errors
    // ========================================================================
    #[error("Invalid audio path: {0}")]
    Path(#[from] PathError),

    /// Prefetch of the resolved URL failed.
    #[error("Failed to load audio {path}: {message}")]
    LoadFailed {
        path: String,
        message: String,
        network: bool,
    },

    #[error("Audio load timed out after {after:?}: {path}")]
    LoadTimeout { path: String, after: Duration },

    /// The element never reported it could play.
    #[error("Audio not ready after {0:?}")]
    ReadyTimeout(Duration),

    // ========================================================================
    // Media Errors
    // ========================================================================
    #[error("Media error: {0}")]
    Media(MediaErrorCode),

    #[error("Playback rejected: {0}")]
    Rejected(PlayRejection),

    // ========================================================================
    // Control Errors
    // ========================================================================
    #[error("Cannot apply {trigger:?} while {state:?}")]
    InvalidTransition {
        state: SessionState,
        trigger: SessionTrigger,
    },

    /// `play()` on a failed session; call `retry()` first.
    #[error("Session {0} is in error state, retry required")]
    RetryRequired(String),

    /// The operation was overtaken by `stop()`, a newer load or destruction.
    #[error("Playback request cancelled")]
    Cancelled,

    #[error("Audio session destroyed: {0}")]
    Destroyed(String),

    #[error("Audio session not found: {0}")]
    SessionNotFound(String),
}

impl PlaybackError {
    pub(crate) fn load_failed(path: impl Into<String>, source: &BridgeError) -> Self {
        PlaybackError::LoadFailed {
            path: path.into(),
            message: source.to_string(),
            network: source.is_network(),
        }
    }

    /// Classified cause for display and retry decisions.
    pub fn kind(&self) -> MediaErrorKind {
        match self {
            PlaybackError::LoadFailed { network: true, .. } => MediaErrorKind::Network,
            PlaybackError::LoadFailed { .. } => MediaErrorKind::Unknown,
            PlaybackError::LoadTimeout { .. } | PlaybackError::ReadyTimeout(_) => {
                MediaErrorKind::Timeout
            }
            PlaybackError::Media(code) => match code {
                MediaErrorCode::Aborted => MediaErrorKind::Aborted,
                MediaErrorCode::Network => MediaErrorKind::Network,
                MediaErrorCode::Decode => MediaErrorKind::Decode,
                MediaErrorCode::SrcNotSupported => MediaErrorKind::UnsupportedFormat,
                MediaErrorCode::Unknown => MediaErrorKind::Unknown,
            },
            PlaybackError::Rejected(rejection) => match rejection {
                PlayRejection::NotAllowed => MediaErrorKind::PlaybackBlocked,
                PlayRejection::NotSupported => MediaErrorKind::UnsupportedFormat,
                PlayRejection::Aborted => MediaErrorKind::Aborted,
                PlayRejection::Other(_) => MediaErrorKind::Unknown,
            },
            PlaybackError::Path(_) => MediaErrorKind::UnsupportedFormat,
            PlaybackError::Cancelled => MediaErrorKind::Aborted,
            PlaybackError::InvalidTransition { .. }
            | PlaybackError::RetryRequired(_)
            | PlaybackError::Destroyed(_)
            | PlaybackError::SessionNotFound(_) => MediaErrorKind::Unknown,
        }
    }

    /// Returns `true` if this error is transient and the operation can be retried.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            MediaErrorKind::Network | MediaErrorKind::Timeout | MediaErrorKind::Aborted
        )
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        matches!(self.kind(), MediaErrorKind::Network | MediaErrorKind::Timeout)
    }

    /// Returns `true` if this error is related to audio format/codec issues.
    pub fn is_format_error(&self) -> bool {
        matches!(self.kind(), MediaErrorKind::UnsupportedFormat)
    }

    /// Message shown in the audio controls.
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::Media(_) | PlaybackError::Rejected(_) => {
                self.kind().user_message().to_string()
            }
            PlaybackError::LoadFailed { .. } if self.is_network_error() => {
                MediaErrorKind::Network.user_message().to_string()
            }
            PlaybackError::LoadFailed { .. } => "音频加载失败".to_string(),
            PlaybackError::LoadTimeout { .. } => "音频加载超时".to_string(),
            PlaybackError::ReadyTimeout(_) => "音频准备超时".to_string(),
            PlaybackError::Path(_) => "音频文件路径无效".to_string(),
            other => other.to_string(),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

// ============================================================================
// Classification
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaErrorKind {
    Network,
    Decode,
    UnsupportedFormat,
    Aborted,
    Timeout,
    /// Autoplay policy refused to start without a user gesture.
    PlaybackBlocked,
    Unknown,
}

impl MediaErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            MediaErrorKind::Network => "网络错误，无法加载音频",
            MediaErrorKind::Decode => "音频解码失败",
            MediaErrorKind::UnsupportedFormat => "不支持的音频格式或文件不存在",
            MediaErrorKind::Aborted => "音频播放被中断",
            MediaErrorKind::Timeout => "音频加载超时",
            MediaErrorKind::PlaybackBlocked => "浏览器阻止了音频播放，请手动点击播放",
            MediaErrorKind::Unknown => "播放失败，请重试",
        }
    }

    /// Controls offer a retry button for these.
    pub fn offers_retry(&self) -> bool {
        matches!(
            self,
            MediaErrorKind::Network
                | MediaErrorKind::Timeout
                | MediaErrorKind::Aborted
                | MediaErrorKind::PlaybackBlocked
                | MediaErrorKind::Unknown
        )
    }
}

impl fmt::Display for MediaErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.user_message())
    }
}
