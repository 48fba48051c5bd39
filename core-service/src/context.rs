//! Application context: every long-lived component, constructed once and
//! passed by reference.

use bridge_traits::location::RouteState;
use core_content::{ContentStore, CourseStatistics, Part};
use core_navigation::{Router, Selection, SelectionState};
use core_playback::{
    PerformanceMonitor, PerformanceReport, PreloadStrategy, SessionManager, ShortcutCommand,
};
use core_runtime::config::AppConfig;
use core_runtime::events::EventBus;
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::Result;
use crate::render::{render_course_list, CourseListView};
use crate::switcher::{ContentSwitcher, ContentView, SwitchOutcome};

pub struct AppContext {
    config: AppConfig,
    events: EventBus,
    monitor: Arc<PerformanceMonitor>,
    store: Arc<ContentStore>,
    sessions: Arc<SessionManager>,
    selection: Arc<SelectionState>,
    router: Router,
    switcher: ContentSwitcher,
    preload: Arc<PreloadStrategy>,
}

impl AppContext {
    /// Wire every component from `config`. Nothing is fetched yet; see
    /// [`init_app`](crate::bootstrap::init_app).
    pub fn new(config: AppConfig, view: Arc<dyn ContentView>) -> Self {
        let events = EventBus::default();
        let monitor = Arc::new(PerformanceMonitor::new(Arc::clone(&config.clock)));

        let store = Arc::new(ContentStore::from_config(&config).with_events(events.clone()));
        let sessions = Arc::new(SessionManager::from_config(
            &config,
            Arc::clone(&monitor),
            Some(events.clone()),
        ));
        let selection = Arc::new(
            SelectionState::from_config(&config, Arc::clone(&store)).with_events(events.clone()),
        );
        let router = Router::from_config(&config, Arc::clone(&selection)).with_events(events.clone());
        let switcher = ContentSwitcher::new(
            Arc::clone(&store),
            Arc::clone(&sessions),
            view,
            config.transitions,
        )
        .with_events(events.clone());
        let preload = Arc::new(PreloadStrategy::new(
            Arc::clone(&store),
            Arc::clone(sessions.loader()),
            Arc::clone(sessions.resolver()),
            config.preload,
        ));

        Self {
            config,
            events,
            monitor,
            store,
            sessions,
            selection,
            router,
            switcher,
            preload,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.monitor
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn selection(&self) -> &Arc<SelectionState> {
        &self.selection
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn switcher(&self) -> &ContentSwitcher {
        &self.switcher
    }

    pub fn preload(&self) -> &Arc<PreloadStrategy> {
        &self.preload
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Handle a part button click: commit the selection, push the route and
    /// switch the pane.
    pub async fn select(&self, course_id: &str, part: &str) -> Result<SwitchOutcome> {
        if self.switcher.is_switching() {
            debug!(course_id, part, "Switch in progress; ignoring selection");
            return Ok(SwitchOutcome::Ignored);
        }

        let previous = self.selection.current().map(|s| s.part);
        let selection = self.router.navigate(course_id, part, true)?;
        self.show(&selection, previous).await
    }

    /// Replay a `popstate`/`hashchange`. `None` when the location carries no
    /// usable route. Ignored without touching the selection while a switch
    /// is running.
    pub async fn on_location_change(
        &self,
        state: Option<&RouteState>,
    ) -> Result<Option<SwitchOutcome>> {
        if self.switcher.is_switching() {
            debug!(?state, "Switch in progress; ignoring location change");
            return Ok(Some(SwitchOutcome::Ignored));
        }

        let previous = self.selection.current().map(|s| s.part);
        let Some(selection) = self.router.on_location_change(state) else {
            return Ok(None);
        };
        self.show(&selection, previous).await.map(Some)
    }

    pub(crate) async fn apply_initial_route(&self) -> Result<Option<SwitchOutcome>> {
        let Some(selection) = self.router.apply_initial_route() else {
            return Ok(None);
        };
        self.show(&selection, None).await.map(Some)
    }

    async fn show(&self, selection: &Selection, previous: Option<Part>) -> Result<SwitchOutcome> {
        self.refresh_course_list();
        let outcome = self
            .switcher
            .switch(
                &selection.course_id,
                selection.part,
                previous,
                self.config.transitions.enabled,
            )
            .await?;
        if outcome != SwitchOutcome::Ignored {
            self.schedule_preload(Some(selection.course_id.clone()));
        }
        Ok(outcome)
    }

    /// Reset to the empty pane.
    pub fn clear_selection(&self) {
        self.router.clear();
        self.sessions.destroy_all();
        self.refresh_course_list();
    }

    pub fn course_list(&self) -> CourseListView {
        render_course_list(&self.store.courses(), self.selection.current().as_ref())
    }

    pub fn refresh_course_list(&self) {
        self.switcher.view().render_course_list(&self.course_list());
    }

    pub(crate) fn schedule_preload(&self, course_id: Option<String>) {
        let strategy = Arc::clone(&self.preload);
        let spawned = core_async::spawn_detached(async move {
            let report = strategy.intelligent_preload(course_id.as_deref()).await;
            debug!(?report, "Preload finished");
        });
        if !spawned {
            debug!("No runtime available; preload skipped");
        }
    }

    // =========================================================================
    // Host events
    // =========================================================================

    /// Apply a keyboard shortcut. Returns the feedback message to show.
    pub async fn handle_key(&self, code: &str, in_editable: bool) -> Option<String> {
        ShortcutCommand::from_key(code, in_editable)?
            .apply(&self.sessions)
            .await
    }

    pub fn page_hidden(&self) -> usize {
        self.sessions.page_hidden()
    }

    pub async fn page_visible(&self) -> usize {
        self.sessions.page_visible().await
    }

    pub fn statistics(&self) -> CourseStatistics {
        self.store.statistics()
    }

    pub fn performance_report(&self) -> PerformanceReport {
        self.monitor.report()
    }

    /// Release every session.
    pub fn shutdown(&self) {
        let destroyed = self.sessions.destroy_all();
        info!(destroyed, "Application context shut down");
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("courses", &self.store.len())
            .field("selection", &self.selection.current())
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
