//! # Application Configuration
//!
//! Builder-based configuration for the lesson core.
//!
//! ## Overview
//!
//! [`AppConfig`] carries every tunable the core uses (content locations, load
//! limits, timeouts, transition timings) together with the host bridges it
//! talks through. The builder validates everything up front so a missing
//! capability is reported at startup, not at the first click.
//!
//! ## Required capabilities
//!
//! - `HttpClient` - lesson JSON fetch
//! - `MediaBackend` - audio elements and prefetch
//!
//! With the `desktop-shims` feature both fall back to `bridge-desktop`
//! adapters when not injected.
//!
//! ## Optional capabilities
//!
//! - `NavigationHistory` - route mirroring (routing is inert without it)
//! - `Clock` - defaults to [`SystemClock`]
//! - `LoggerSink` - host log forwarding
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::AppConfig;
//! use std::sync::Arc;
//!
//! let config = AppConfig::builder()
//!     .data_root("data")
//!     .known_courses(["Class01", "Class02"])
//!     .http_client(Arc::new(MyHttpClient))
//!     .media_backend(Arc::new(MyMediaBackend))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{Clock, HttpClient, LoggerSink, MediaBackend, NavigationHistory, SystemClock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_DATA_ROOT: &str = "data";
pub const DEFAULT_MEDIA_ROOT: &str = "Sound";
pub const DEFAULT_KNOWN_COURSES: &[&str] = &["Class01", "Class02"];
pub const DEFAULT_MAX_CONCURRENT_LOADS: usize = 3;
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_HISTORY: usize = 10;

// ============================================================================
// Base path rules
// ============================================================================

/// A hosting environment recognised by its origin.
///
/// When `origin_contains` matches the page origin, the site is treated as
/// deployed at the site root of that host: `"./"` normally, `"../../"` when
/// the address also carries a hash route and the pathname contains
/// `path_contains`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostingRule {
    pub origin_contains: String,
    pub path_contains: String,
}

impl HostingRule {
    pub fn new(origin_contains: impl Into<String>, path_contains: impl Into<String>) -> Self {
        Self {
            origin_contains: origin_contains.into(),
            path_contains: path_contains.into(),
        }
    }
}

/// Ordered hosting rules consulted before the generic pathname heuristic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasePathRules {
    pub hosting: Vec<HostingRule>,
}

impl BasePathRules {
    /// No hosting rules; only the pathname heuristic applies.
    pub fn none() -> Self {
        Self {
            hosting: Vec::new(),
        }
    }

    pub fn with_rule(mut self, rule: HostingRule) -> Self {
        self.hosting.push(rule);
        self
    }
}

impl Default for BasePathRules {
    fn default() -> Self {
        Self::none().with_rule(HostingRule::new("github.io", "/jyut"))
    }
}

// ============================================================================
// Transitions and preload
// ============================================================================

/// Visual style of the content switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    #[default]
    Fade,
    Slide,
    Scale,
    Flip,
}

impl AnimationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationKind::Fade => "fade",
            AnimationKind::Slide => "slide",
            AnimationKind::Scale => "scale",
            AnimationKind::Flip => "flip",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionConfig {
    /// Animate part switches. Course switches without a previous part are
    /// always direct.
    pub enabled: bool,
    pub exit: Duration,
    pub enter: Duration,
    pub animation: AnimationKind,
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            exit: Duration::from_millis(300),
            enter: Duration::from_millis(500),
            animation: AnimationKind::Fade,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadConfig {
    pub enabled: bool,
    /// Delay before warming the course after the current one.
    pub next_course_delay: Duration,
}

impl Default for PreloadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            next_course_delay: Duration::from_secs(2),
        }
    }
}

// ============================================================================
// AppConfig
// ============================================================================

/// Complete configuration for the lesson core. Build with [`AppConfig::builder`].
#[derive(Clone)]
pub struct AppConfig {
    /// Directory holding `<courseId>/courses.json`
    pub data_root: String,
    /// Directory holding audio, relative to the site root
    pub media_root: String,
    /// Course ids tried during discovery, in display order
    pub known_courses: Vec<String>,
    pub base_path_rules: BasePathRules,
    pub max_concurrent_loads: usize,
    pub load_timeout: Duration,
    pub ready_timeout: Duration,
    pub max_history: usize,
    pub enable_routing: bool,
    pub transitions: TransitionConfig,
    pub preload: PreloadConfig,
    pub http_client: Arc<dyn HttpClient>,
    pub media_backend: Arc<dyn MediaBackend>,
    pub history: Option<Arc<dyn NavigationHistory>>,
    pub clock: Arc<dyn Clock>,
    pub logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("data_root", &self.data_root)
            .field("media_root", &self.media_root)
            .field("known_courses", &self.known_courses)
            .field("base_path_rules", &self.base_path_rules)
            .field("max_concurrent_loads", &self.max_concurrent_loads)
            .field("load_timeout", &self.load_timeout)
            .field("ready_timeout", &self.ready_timeout)
            .field("max_history", &self.max_history)
            .field("enable_routing", &self.enable_routing)
            .field("transitions", &self.transitions)
            .field("preload", &self.preload)
            .field("http_client", &"HttpClient { ... }")
            .field("media_backend", &"MediaBackend { ... }")
            .field(
                "history",
                &self.history.as_ref().map(|_| "NavigationHistory { ... }"),
            )
            .field(
                "logger_sink",
                &self.logger_sink.as_ref().map(|_| "LoggerSink { ... }"),
            )
            .finish()
    }
}

impl AppConfig {
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// URL of the lesson JSON for `course_id`.
    pub fn course_data_url(&self, course_id: &str) -> String {
        format!("{}/{}/courses.json", self.data_root.trim_end_matches('/'), course_id)
    }

    /// Whether selection changes should be mirrored into the address bar.
    pub fn routing_active(&self) -> bool {
        self.enable_routing && self.history.is_some()
    }

    /// Checks value ranges. Capabilities are checked by the builder.
    pub fn validate(&self) -> Result<()> {
        if self.data_root.trim().is_empty() {
            return Err(Error::Config("Data root cannot be empty".to_string()));
        }

        if self.media_root.trim().is_empty() {
            return Err(Error::Config("Media root cannot be empty".to_string()));
        }

        if self.known_courses.is_empty() {
            return Err(Error::Config(
                "At least one known course id is required".to_string(),
            ));
        }

        if self.known_courses.iter().any(|id| id.trim().is_empty()) {
            return Err(Error::Config("Course ids cannot be empty".to_string()));
        }

        if self.max_concurrent_loads == 0 {
            return Err(Error::Config(
                "max_concurrent_loads must be greater than 0".to_string(),
            ));
        }

        if self.load_timeout.is_zero() || self.ready_timeout.is_zero() {
            return Err(Error::Config("Timeouts must be greater than 0".to_string()));
        }

        if self.max_history == 0 {
            return Err(Error::Config(
                "max_history must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "An HttpClient is required to fetch lesson data. \
                 Browser: inject bridge_wasm::WasmHttpClient. \
                 Desktop: enable the 'desktop-shims' feature or inject a client."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn media_backend_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaBackend".to_string(),
        message: "A MediaBackend is required to create audio sessions. \
                 Browser: inject bridge_wasm::HtmlAudioBackend. \
                 Desktop: enable the 'desktop-shims' feature or inject a backend."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new()
        .map_err(|e| Error::Internal(format!("Failed to create default HttpClient: {}", e)))?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_media_backend(http: &Arc<dyn HttpClient>) -> Result<Arc<dyn MediaBackend>> {
    use bridge_desktop::HeadlessMediaBackend;

    Ok(Arc::new(HeadlessMediaBackend::new(Arc::clone(http))))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_media_backend(_http: &Arc<dyn HttpClient>) -> Result<Arc<dyn MediaBackend>> {
    Err(media_backend_missing_error())
}

/// Builder for [`AppConfig`].
#[derive(Default)]
pub struct AppConfigBuilder {
    data_root: Option<String>,
    media_root: Option<String>,
    known_courses: Option<Vec<String>>,
    base_path_rules: Option<BasePathRules>,
    max_concurrent_loads: Option<usize>,
    load_timeout: Option<Duration>,
    ready_timeout: Option<Duration>,
    max_history: Option<usize>,
    enable_routing: Option<bool>,
    transitions: Option<TransitionConfig>,
    preload: Option<PreloadConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    media_backend: Option<Arc<dyn MediaBackend>>,
    history: Option<Arc<dyn NavigationHistory>>,
    clock: Option<Arc<dyn Clock>>,
    logger_sink: Option<Arc<dyn LoggerSink>>,
}

impl AppConfigBuilder {
    /// Directory holding per-course JSON. Default: `data`.
    pub fn data_root(mut self, root: impl Into<String>) -> Self {
        self.data_root = Some(root.into());
        self
    }

    /// Directory holding audio files. Default: `Sound`.
    pub fn media_root(mut self, root: impl Into<String>) -> Self {
        self.media_root = Some(root.into());
        self
    }

    /// Course ids tried during discovery. Default: `Class01`, `Class02`.
    pub fn known_courses<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_courses = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn base_path_rules(mut self, rules: BasePathRules) -> Self {
        self.base_path_rules = Some(rules);
        self
    }

    /// Default: 3
    pub fn max_concurrent_loads(mut self, limit: usize) -> Self {
        self.max_concurrent_loads = Some(limit);
        self
    }

    /// Default: 10 s
    pub fn load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = Some(timeout);
        self
    }

    /// Default: 5 s
    pub fn ready_timeout(mut self, timeout: Duration) -> Self {
        self.ready_timeout = Some(timeout);
        self
    }

    /// Default: 10
    pub fn max_history(mut self, entries: usize) -> Self {
        self.max_history = Some(entries);
        self
    }

    pub fn enable_routing(mut self, enabled: bool) -> Self {
        self.enable_routing = Some(enabled);
        self
    }

    pub fn transitions(mut self, transitions: TransitionConfig) -> Self {
        self.transitions = Some(transitions);
        self
    }

    pub fn preload(mut self, preload: PreloadConfig) -> Self {
        self.preload = Some(preload);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn media_backend(mut self, backend: Arc<dyn MediaBackend>) -> Self {
        self.media_backend = Some(backend);
        self
    }

    pub fn history(mut self, history: Arc<dyn NavigationHistory>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn logger_sink(mut self, sink: Arc<dyn LoggerSink>) -> Self {
        self.logger_sink = Some(sink);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    ///
    /// - [`Error::CapabilityMissing`] when no `HttpClient` or `MediaBackend`
    ///   is available
    /// - [`Error::Config`] when a value is out of range
    pub fn build(self) -> Result<AppConfig> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let media_backend = match self.media_backend {
            Some(backend) => backend,
            None => provide_default_media_backend(&http_client)?,
        };

        let config = AppConfig {
            data_root: self
                .data_root
                .unwrap_or_else(|| DEFAULT_DATA_ROOT.to_string()),
            media_root: self
                .media_root
                .unwrap_or_else(|| DEFAULT_MEDIA_ROOT.to_string()),
            known_courses: self.known_courses.unwrap_or_else(|| {
                DEFAULT_KNOWN_COURSES
                    .iter()
                    .map(|id| id.to_string())
                    .collect()
            }),
            base_path_rules: self.base_path_rules.unwrap_or_default(),
            max_concurrent_loads: self
                .max_concurrent_loads
                .unwrap_or(DEFAULT_MAX_CONCURRENT_LOADS),
            load_timeout: self.load_timeout.unwrap_or(DEFAULT_LOAD_TIMEOUT),
            ready_timeout: self.ready_timeout.unwrap_or(DEFAULT_READY_TIMEOUT),
            max_history: self.max_history.unwrap_or(DEFAULT_MAX_HISTORY),
            enable_routing: self.enable_routing.unwrap_or(true),
            transitions: self.transitions.unwrap_or_default(),
            preload: self.preload.unwrap_or_default(),
            http_client,
            media_backend,
            history: self.history,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            logger_sink: self.logger_sink,
        };

        config.validate()?;

        Ok(config)
    }
}
