//! # Selection State
//!
//! The learner's current `(course, part)` and a short history of past
//! selections.
//!
//! ## Overview
//!
//! The selection only changes through [`SelectionState::select`], which
//! validates the target against the [`ContentStore`] first. A rejected
//! target leaves both the selection and the history untouched, so the
//! selection is always either unset or a pair that exists and has content.
//!
//! Committed changes fan out synchronously to [`StateListeners`]:
//!
//! - `CourseChange` when the course differs from the previous one
//! - `PartChange` when the part differs
//! - `StateChange` on every commit and on [`SelectionState::clear`]
//!
//! ## Usage
//!
//! ```ignore
//! let selection = SelectionState::new(store, clock, 10);
//! selection.listeners().subscribe(ListenerCategory::CourseChange, |change| {
//!     println!("now on {:?}", change.current);
//! });
//! selection.select("Class01", "A")?;
//! ```

use bridge_traits::time::Clock;
use core_content::{ContentStore, Part};
use core_runtime::config::AppConfig;
use core_runtime::events::{CoreEvent, EventBus, ListenerCategory, NavigationEvent, StateListeners};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{NavigationError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub course_id: String,
    pub part: Part,
}

impl Selection {
    pub fn new(course_id: impl Into<String>, part: Part) -> Self {
        Self {
            course_id: course_id.into(),
            part,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub course_id: String,
    pub part: Part,
    pub timestamp: i64,
}

impl HistoryEntry {
    fn matches(&self, selection: &Selection) -> bool {
        self.course_id == selection.course_id && self.part == selection.part
    }
}

/// Payload delivered to every listener category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    pub previous: Option<Selection>,
    pub current: Option<Selection>,
}

pub struct SelectionState {
    store: Arc<ContentStore>,
    clock: Arc<dyn Clock>,
    max_history: usize,
    current: Mutex<Option<Selection>>,
    history: Mutex<VecDeque<HistoryEntry>>,
    listeners: StateListeners<SelectionChange>,
    events: Option<EventBus>,
}

impl SelectionState {
    pub fn new(store: Arc<ContentStore>, clock: Arc<dyn Clock>, max_history: usize) -> Self {
        Self {
            store,
            clock,
            max_history: max_history.max(1),
            current: Mutex::new(None),
            history: Mutex::new(VecDeque::new()),
            listeners: StateListeners::new(),
            events: None,
        }
    }

    pub fn from_config(config: &AppConfig, store: Arc<ContentStore>) -> Self {
        Self::new(store, Arc::clone(&config.clock), config.max_history)
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    pub fn listeners(&self) -> &StateListeners<SelectionChange> {
        &self.listeners
    }

    pub fn current(&self) -> Option<Selection> {
        self.current.lock().clone()
    }

    pub fn is_selected(&self, course_id: &str, part: Part) -> bool {
        self.current
            .lock()
            .as_ref()
            .is_some_and(|s| s.course_id == course_id && s.part == part)
    }

    fn emit(&self, event: NavigationEvent) {
        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Navigation(event));
        }
    }

    /// Check that `(course_id, part)` names an existing, non-empty part.
    pub fn validate(&self, course_id: &str, part: &str) -> Result<Selection> {
        if course_id.is_empty() || part.is_empty() {
            return Err(NavigationError::MissingSelection);
        }
        let parsed = Part::parse(part).ok_or_else(|| NavigationError::InvalidPart(part.to_string()))?;
        let course = self
            .store
            .course(course_id)
            .ok_or_else(|| NavigationError::UnknownCourse(course_id.to_string()))?;
        if !course.has_part(parsed) {
            return Err(NavigationError::EmptyPart {
                course_id: course_id.to_string(),
                part: part.to_string(),
            });
        }
        Ok(Selection::new(course_id, parsed))
    }

    /// Validate and commit a new selection.
    ///
    /// On failure nothing changes and no listener runs.
    pub fn select(&self, course_id: &str, part: &str) -> Result<Selection> {
        let selection = match self.validate(course_id, part) {
            Ok(selection) => selection,
            Err(e) => {
                warn!(course_id, part, error = %e, "Selection rejected");
                return Err(e);
            }
        };

        let previous = self.current.lock().replace(selection.clone());
        self.push_history(&selection);

        let change = SelectionChange {
            previous: previous.clone(),
            current: Some(selection.clone()),
        };
        let course_changed = previous.as_ref().map(|p| p.course_id.as_str()) != Some(course_id);
        let part_changed = previous.as_ref().map(|p| p.part) != Some(selection.part);

        if course_changed {
            self.listeners.notify(ListenerCategory::CourseChange, &change);
        }
        if part_changed {
            self.listeners.notify(ListenerCategory::PartChange, &change);
        }
        self.listeners.notify(ListenerCategory::StateChange, &change);

        info!(course_id, part = %selection.part, "Selection updated");
        self.emit(NavigationEvent::SelectionChanged {
            course_id: selection.course_id.clone(),
            part: selection.part.as_str().to_string(),
        });
        Ok(selection)
    }

    /// Reset to unset. Returns the selection that was cleared.
    pub fn clear(&self) -> Option<Selection> {
        let previous = self.current.lock().take();
        self.listeners.notify(
            ListenerCategory::StateChange,
            &SelectionChange {
                previous: previous.clone(),
                current: None,
            },
        );
        debug!("Selection cleared");
        self.emit(NavigationEvent::SelectionCleared);
        previous
    }

    // =========================================================================
    // History
    // =========================================================================

    fn push_history(&self, selection: &Selection) {
        let mut history = self.history.lock();
        if history.back().is_some_and(|last| last.matches(selection)) {
            return;
        }
        history.push_back(HistoryEntry {
            course_id: selection.course_id.clone(),
            part: selection.part,
            timestamp: self.clock.unix_timestamp_millis(),
        });
        while history.len() > self.max_history {
            history.pop_front();
        }
    }

    /// Oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.lock().iter().cloned().collect()
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

impl std::fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionState")
            .field("current", &self.current())
            .field("history_len", &self.history.lock().len())
            .field("max_history", &self.max_history)
            .finish()
    }
}
