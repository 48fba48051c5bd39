//! # Desktop Bridge Implementations
//!
//! Native hosts for the lesson core (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - [`ReqwestHttpClient`] - fetch a deployed lesson site over HTTP
//! - [`DirectoryContentClient`] - serve a site checkout from disk
//! - [`HeadlessMediaBackend`] - silent media elements, reachability-checked
//!   prefetch
//! - [`MemoryNavigationHistory`] - route history without an address bar
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DirectoryContentClient, HeadlessMediaBackend};
//! use std::sync::Arc;
//!
//! let http = Arc::new(DirectoryContentClient::new("./site"));
//! let media = Arc::new(HeadlessMediaBackend::new(http.clone()));
//! ```

mod directory;
mod history;
mod http;
mod media;

pub use directory::DirectoryContentClient;
pub use history::MemoryNavigationHistory;
pub use http::ReqwestHttpClient;
pub use media::{HeadlessElement, HeadlessMediaBackend};
