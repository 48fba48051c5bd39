//! # Host Bridge Traits
//!
//! Contracts between the lesson core and the page (or native shell) hosting it.
//!
//! ## Overview
//!
//! The core never performs I/O itself. Everything it needs from the outside
//! world is expressed as a trait here and injected at startup:
//!
//! - [`HttpClient`](http::HttpClient) - fetch lesson JSON
//! - [`MediaBackend`](media::MediaBackend) / [`MediaElement`](media::MediaElement) -
//!   create playable audio elements and prefetch audio
//! - [`NavigationHistory`](location::NavigationHistory) - read the page
//!   address and push route entries
//! - [`Clock`](time::Clock) - wall-clock time for history timestamps
//! - [`LoggerSink`](time::LoggerSink) - forward log records to the host
//!
//! ## Implementations
//!
//! | Host    | Crate            |
//! |---------|------------------|
//! | Browser | `bridge-wasm`    |
//! | Native  | `bridge-desktop` |
//!
//! ## Thread Safety
//!
//! Bridge traits are bounded by [`PlatformSendSync`](platform::PlatformSendSync):
//! `Send + Sync` on native targets, unbounded on `wasm32` where browser handles
//! are single-threaded.

pub mod error;
pub mod http;
pub mod location;
pub mod media;
pub mod platform;
pub mod time;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use location::{NavigationHistory, PageLocation, RouteState};
pub use media::{
    MediaBackend, MediaElement, MediaErrorCode, MediaEvent, MediaListener, PlayRejection,
    ReadyState,
};
pub use platform::{PlatformSend, PlatformSendSync};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};
