//! # Lesson Player Service
//!
//! Wires the content store, playback, navigation and rendering crates into
//! one [`AppContext`] and drives it from host events.
//!
//! ## Overview
//!
//! The host supplies bridges through [`AppConfig`] and a [`ContentView`]
//! that turns view models into markup. Everything else is constructed by
//! [`init_app`]:
//!
//! ```ignore
//! let config = AppConfig::builder()
//!     .http_client(http)
//!     .media_backend(audio)
//!     .history(history)
//!     .build()?;
//! let app = init_app(config, view).await?;
//!
//! // part button click
//! app.select("Class01", "A").await?;
//! // popstate / hashchange
//! app.on_location_change(None).await?;
//! // keydown
//! if let Some(message) = app.handle_key("Space", false).await {
//!     show_feedback(&message);
//! }
//! ```
//!
//! Desktop builds enable the `desktop-shims` feature, which provides default
//! adapters from `bridge-desktop`; WebAssembly builds enable `wasm` and use
//! [`bootstrap_wasm`].

pub mod bootstrap;
pub mod context;
pub mod error;
pub mod render;
pub mod switcher;

pub use bootstrap::{init_app, init_host_logging};
pub use context::AppContext;
pub use error::{CoreError, Result};
pub use render::{
    render_audio_controls, render_breadcrumb, render_course_list, render_part, AudioControlsView,
    BreadcrumbView, ContentPaneView, CourseItemView, CourseListView, ParagraphAudio, ParagraphView,
    PartButtonView, PrimaryButton,
};
pub use switcher::{
    enter_class, exit_class, ContentSwitched, ContentSwitcher, ContentView, SwitchDirection,
    SwitchOutcome,
};

pub use core_runtime::config::AppConfig;

/// Serve lessons and audio from a local site directory.
///
/// ```no_run
/// # #[cfg(feature = "desktop-shims")]
/// # async fn example(view: std::sync::Arc<dyn core_service::ContentView>) -> core_service::Result<()> {
/// let app = core_service::bootstrap_directory("./site", view).await?;
/// println!("{} courses", app.store().len());
/// # Ok(())
/// # }
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub async fn bootstrap_directory(
    root: impl Into<std::path::PathBuf>,
    view: std::sync::Arc<dyn ContentView>,
) -> Result<AppContext> {
    use std::sync::Arc;

    use bridge_desktop::{DirectoryContentClient, HeadlessMediaBackend, MemoryNavigationHistory};
    use bridge_traits::http::HttpClient;
    use bridge_traits::location::PageLocation;

    let http: Arc<dyn HttpClient> = Arc::new(DirectoryContentClient::new(root));
    let config = AppConfig::builder()
        .http_client(Arc::clone(&http))
        .media_backend(Arc::new(HeadlessMediaBackend::new(http)))
        .history(Arc::new(MemoryNavigationHistory::new(PageLocation::local())))
        .build()?;
    init_app(config, view).await
}

/// Convenience bootstrapper for browser hosts: fetch, `<audio>` and the
/// History API from `bridge-wasm`. Logs to the devtools console unless the
/// page already installed a subscriber.
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(view: std::sync::Arc<dyn ContentView>) -> Result<AppContext> {
    use std::sync::Arc;

    use bridge_wasm::{BrowserHistory, HtmlAudioBackend, WasmHttpClient};
    use core_runtime::logging::LoggingConfig;

    init_host_logging(LoggingConfig::default());
    let history = BrowserHistory::new()
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;
    let config = AppConfig::builder()
        .http_client(Arc::new(WasmHttpClient::new()))
        .media_backend(Arc::new(HtmlAudioBackend::new()))
        .history(Arc::new(history))
        .build()?;
    init_app(config, view).await
}
