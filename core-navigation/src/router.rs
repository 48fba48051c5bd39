//! Mirrors the selection into the address bar and replays address changes
//! back into the selection.

use bridge_traits::location::{NavigationHistory, RouteState};
use core_runtime::config::AppConfig;
use core_runtime::events::{CoreEvent, EventBus, NavigationEvent};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::route::Route;
use crate::selection::{Selection, SelectionState};

pub struct Router {
    selection: Arc<SelectionState>,
    history: Option<Arc<dyn NavigationHistory>>,
    enabled: bool,
    events: Option<EventBus>,
}

impl Router {
    pub fn new(
        selection: Arc<SelectionState>,
        history: Option<Arc<dyn NavigationHistory>>,
        enabled: bool,
    ) -> Self {
        Self {
            selection,
            history,
            enabled,
            events: None,
        }
    }

    pub fn from_config(config: &AppConfig, selection: Arc<SelectionState>) -> Self {
        Self::new(selection, config.history.clone(), config.enable_routing)
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn selection(&self) -> &Arc<SelectionState> {
        &self.selection
    }

    /// Routing is on and a history host is attached.
    pub fn is_active(&self) -> bool {
        self.enabled && self.history.is_some()
    }

    fn active_history(&self) -> Option<&Arc<dyn NavigationHistory>> {
        if self.enabled {
            self.history.as_ref()
        } else {
            None
        }
    }

    fn emit(&self, event: NavigationEvent) {
        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Navigation(event));
        }
    }

    /// Commit a selection and, when `update_url` is set, push it as a route.
    ///
    /// A failed push is logged; the selection still stands.
    pub fn navigate(&self, course_id: &str, part: &str, update_url: bool) -> Result<Selection> {
        let selection = self.selection.select(course_id, part)?;
        if update_url {
            self.push_route(&Route::new(selection.course_id.clone(), selection.part));
        }
        Ok(selection)
    }

    /// Clear the selection and the route.
    pub fn clear(&self) -> Option<Selection> {
        let previous = self.selection.clear();
        self.clear_route();
        previous
    }

    fn push_route(&self, route: &Route) {
        let Some(history) = self.active_history() else {
            return;
        };
        match history.push(Some(&route.to_state()), &route.to_hash()) {
            Ok(()) => debug!(route = %route, "Route pushed"),
            Err(e) => warn!(route = %route, error = %e, "Failed to push route"),
        }
    }

    fn clear_route(&self) {
        let Some(history) = self.active_history() else {
            return;
        };
        if let Err(e) = history.push(None, "") {
            warn!(error = %e, "Failed to clear route");
            return;
        }
        self.emit(NavigationEvent::RouteCleared);
    }

    /// Route currently shown in the address bar.
    pub fn current_route(&self) -> Option<Route> {
        let history = self.active_history()?;
        Route::parse(&history.location().hash)
    }

    /// Replay a location change (`popstate` or a hash edit).
    ///
    /// A history entry's own state wins over the address bar. Selections
    /// applied here never push a new route. Returns the applied selection.
    pub fn on_location_change(&self, state: Option<&RouteState>) -> Option<Selection> {
        if !self.enabled {
            return None;
        }

        if let Some(state) = state.filter(|s| !s.course_id.is_empty() && !s.part.is_empty()) {
            return self.replay(&state.course_id, &state.part);
        }

        let route = self.current_route()?;
        if self.selection.store().course(&route.course_id).is_none() {
            warn!(course_id = %route.course_id, "Route names an unknown course");
            self.clear_route();
            return None;
        }
        self.replay(&route.course_id, route.part.as_str())
    }

    /// Apply whatever route the page was opened with.
    pub fn apply_initial_route(&self) -> Option<Selection> {
        self.on_location_change(None)
    }

    fn replay(&self, course_id: &str, part: &str) -> Option<Selection> {
        let selection = self.navigate(course_id, part, false).ok()?;
        info!(course_id, part, "Applied route");
        self.emit(NavigationEvent::RouteApplied {
            course_id: selection.course_id.clone(),
            part: selection.part.as_str().to_string(),
        });
        Some(selection)
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("enabled", &self.enabled)
            .field("has_history", &self.history.is_some())
            .finish()
    }
}
