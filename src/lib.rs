//! Workspace facade crate.
//!
//! This crate exposes feature flags that map to the individual workspace crates
//! (`core-service`, `core-playback`, `core-content`). Host applications can
//! depend on `jyut-lessons` and enable the documented features without wiring
//! each crate individually.

#[cfg(feature = "desktop-shims")]
pub use core_service::*;

#[cfg(all(feature = "wasm", not(feature = "desktop-shims")))]
pub use core_service::*;

#[cfg(feature = "playback-only")]
pub use core_content as content;

#[cfg(feature = "playback-only")]
pub use core_playback as playback;
