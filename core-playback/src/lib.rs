//! # Audio Playback Module
//!
//! Audio sessions for lesson paragraphs and the machinery around them.
//!
//! ## Overview
//!
//! This module handles:
//! - Resolving content-relative audio paths against the deployed page
//! - One [`AudioSession`] per paragraph, driven by an explicit state machine
//! - A [`SessionManager`] that keeps at most one session playing or paused
//! - Bounded, memoized prefetching ([`LazyLoader`]) and speculative warming
//!   ([`PreloadStrategy`])
//! - Load and switch latency tracking ([`PerformanceMonitor`])
//! - Keyboard shortcut commands and page visibility handling

pub mod error;
pub mod format;
pub mod loader;
pub mod manager;
pub mod metrics;
pub mod path;
pub mod preload;
pub mod session;
pub mod shortcuts;

pub use error::{MediaErrorKind, PlaybackError, Result};
pub use format::format_time;
pub use loader::{LazyLoader, LoaderStats, PreloadReport};
pub use manager::{ManagerStats, SessionManager};
pub use metrics::{ErrorCategory, PerformanceMonitor, PerformanceReport};
pub use path::{base_path, resolve_audio_path, PathError, PathResolver};
pub use preload::PreloadStrategy;
pub use session::{
    AudioSession, PlaybackCoordinator, SessionContext, SessionError, SessionSnapshot,
    SessionState, SessionTrigger, StatusText,
};
pub use shortcuts::ShortcutCommand;
