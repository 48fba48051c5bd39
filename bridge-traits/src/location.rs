//! Page location and history integration.
//!
//! The core never touches `window.location` directly. It reads a
//! [`PageLocation`] snapshot to derive relative asset paths and mirrors the
//! current selection into the address bar through [`NavigationHistory`].

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::platform::PlatformSendSync;

/// Snapshot of the page address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageLocation {
    /// Scheme + host + port, e.g. `https://someone.github.io`.
    pub origin: String,
    /// Path component, always starting with `/`.
    pub pathname: String,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
}

impl PageLocation {
    pub fn new(
        origin: impl Into<String>,
        pathname: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        let mut pathname = pathname.into();
        if !pathname.starts_with('/') {
            pathname.insert(0, '/');
        }
        Self {
            origin: origin.into(),
            pathname,
            hash: hash.into(),
        }
    }

    /// Site root on a local development server.
    pub fn local() -> Self {
        Self::new("http://localhost:8000", "/", "")
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }
}

/// State object stored alongside a pushed history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteState {
    pub course_id: String,
    pub part: String,
}

/// Host browser history.
pub trait NavigationHistory: PlatformSendSync {
    /// Current address snapshot.
    fn location(&self) -> PageLocation;

    /// Push a new entry. `hash` is the fragment to show (`#Class01/A`);
    /// `None` state with an empty hash clears the route back to the bare
    /// pathname.
    fn push(&self, state: Option<&RouteState>, hash: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pathname_normalized() {
        let location = PageLocation::new("https://x.github.io", "jyut/index.html", "");
        assert_eq!(location.pathname, "/jyut/index.html");
    }

    #[test]
    fn test_route_state_serializes_camel_case() {
        let state = RouteState {
            course_id: "Class01".into(),
            part: "A".into(),
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["courseId"], "Class01");
        assert_eq!(json["part"], "A");
    }
}
