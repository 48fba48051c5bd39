//! Browser Bridge Implementations
//!
//! Hosts the lesson core inside a web page through `web-sys`:
//!
//! - [`WasmHttpClient`] - `fetch` for lesson JSON
//! - [`HtmlAudioBackend`] - one `<audio>` element per session, `preload="auto"`
//!   prefetch
//! - [`BrowserHistory`] - `pushState` routing over `window.history`
//!
//! # Platform Support
//!
//! Compiles only for `wasm32-unknown-unknown`.
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{route_state, BrowserHistory};
//!
//! // In a popstate handler:
//! let state = route_state(&event.state());
//! app.on_location_change(state.as_ref()).await?;
//! ```

#![cfg(target_arch = "wasm32")]

pub mod error;
pub mod history;
pub mod http;
pub mod media;

pub use error::{WasmError, WasmResult};
pub use history::{current_location, route_state, BrowserHistory};
pub use http::WasmHttpClient;
pub use media::{HtmlAudio, HtmlAudioBackend};
