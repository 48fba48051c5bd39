//! # Content Switcher
//!
//! Replaces the paragraph pane when the selection changes.
//!
//! ## Overview
//!
//! An animated switch runs in two phases around the re-render:
//!
//! ```text
//! stop all audio -> exit transition (300 ms) -> destroy sessions
//!     -> render part + create sessions -> enter transition (500 ms)
//!     -> switch complete
//! ```
//!
//! A direct switch skips both transitions. Only one switch runs at a time;
//! requests that arrive meanwhile return [`SwitchOutcome::Ignored`].

use bridge_traits::platform::PlatformSendSync;
use core_content::{ContentError, ContentStore, Course, Part};
use core_playback::{PerformanceMonitor, SessionManager};
use core_runtime::config::{AnimationKind, TransitionConfig};
use core_runtime::events::{ContentEvent, CoreEvent, EventBus, ListenerCategory, StateListeners};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::render::{
    playable_audio, render_breadcrumb, render_part, BreadcrumbView, ContentPaneView,
    CourseListView,
};

/// Host side of the content pane.
pub trait ContentView: PlatformSendSync {
    /// Apply a transition class to the pane, or clear it with `None`.
    fn show_transition(&self, class_name: Option<&str>);

    fn render_content(&self, view: &ContentPaneView);

    fn render_breadcrumb(&self, view: &BreadcrumbView);

    /// Redraw the course sidebar. Hosts without one can ignore this.
    fn render_course_list(&self, _view: &CourseListView) {}
}

// =============================================================================
// Direction and class names
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SwitchDirection {
    /// A to B, shown as moving right.
    Forward,
    /// B to A, shown as moving left.
    Backward,
}

impl SwitchDirection {
    pub fn between(from: Option<Part>, to: Part) -> Self {
        match (from, to) {
            (Some(Part::B), Part::A) => SwitchDirection::Backward,
            _ => SwitchDirection::Forward,
        }
    }

    fn side(&self) -> &'static str {
        match self {
            SwitchDirection::Forward => "right",
            SwitchDirection::Backward => "left",
        }
    }
}

pub fn exit_class(animation: AnimationKind, direction: SwitchDirection) -> String {
    match animation {
        AnimationKind::Slide => format!("content-slide-exit-{}", direction.side()),
        other => format!("content-{}-exit", other.as_str()),
    }
}

pub fn enter_class(animation: AnimationKind, direction: SwitchDirection) -> String {
    match animation {
        AnimationKind::Slide => format!("content-slide-enter-{}", direction.side()),
        other => format!("content-{}-enter", other.as_str()),
    }
}

// =============================================================================
// Switcher
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Animated,
    Direct,
    /// Another switch was still running.
    Ignored,
}

/// Payload of the `ContentSwitch` listener category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentSwitched {
    pub course_id: String,
    pub part: Part,
    pub animated: bool,
    /// Sessions created for the new pane.
    pub sessions: usize,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct ContentSwitcher {
    store: Arc<ContentStore>,
    sessions: Arc<SessionManager>,
    view: Arc<dyn ContentView>,
    monitor: Arc<PerformanceMonitor>,
    transitions: TransitionConfig,
    switching: AtomicBool,
    listeners: StateListeners<ContentSwitched>,
    events: Option<EventBus>,
}

impl ContentSwitcher {
    pub fn new(
        store: Arc<ContentStore>,
        sessions: Arc<SessionManager>,
        view: Arc<dyn ContentView>,
        transitions: TransitionConfig,
    ) -> Self {
        let monitor = Arc::clone(sessions.monitor());
        Self {
            store,
            sessions,
            view,
            monitor,
            transitions,
            switching: AtomicBool::new(false),
            listeners: StateListeners::new(),
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    pub fn is_switching(&self) -> bool {
        self.switching.load(Ordering::Acquire)
    }

    pub fn listeners(&self) -> &StateListeners<ContentSwitched> {
        &self.listeners
    }

    pub fn view(&self) -> &Arc<dyn ContentView> {
        &self.view
    }

    fn emit(&self, event: ContentEvent) {
        if let Some(events) = &self.events {
            let _ = events.emit(CoreEvent::Content(event));
        }
    }

    /// Show `part` of `course_id`, animating when `animated` is set and the
    /// previous part differs.
    #[instrument(skip(self))]
    pub async fn switch(
        &self,
        course_id: &str,
        part: Part,
        previous_part: Option<Part>,
        animated: bool,
    ) -> Result<SwitchOutcome> {
        if self
            .switching
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(course_id, "Switch already in progress; ignoring");
            return Ok(SwitchOutcome::Ignored);
        }
        let in_flight = InFlight(&self.switching);

        let course = self
            .store
            .course(course_id)
            .ok_or_else(|| ContentError::NotFound(course_id.to_string()))?;

        let animate = animated
            && self.transitions.enabled
            && previous_part.is_some_and(|previous| previous != part);
        let direction = SwitchDirection::between(previous_part, part);
        let started = core_async::Instant::now();

        self.emit(ContentEvent::SwitchStarted {
            course_id: course_id.to_string(),
            part: part.as_str().to_string(),
        });

        self.sessions.stop_all();
        self.view
            .render_breadcrumb(&render_breadcrumb(course_id, Some(&course), part));

        if animate {
            let exit = exit_class(self.transitions.animation, direction);
            self.view.show_transition(Some(&exit));
            core_async::sleep(self.transitions.exit).await;
            self.view.show_transition(None);
        }

        self.sessions.destroy_all();
        let created = self.render(&course, part);

        if animate {
            let enter = enter_class(self.transitions.animation, direction);
            self.view.show_transition(Some(&enter));
            core_async::sleep(self.transitions.enter).await;
            self.view.show_transition(None);
        }

        drop(in_flight);

        self.monitor
            .record_content_switch(course_id, part.as_str(), started.elapsed());
        info!(course_id, part = %part, animated = animate, sessions = created, "Content switch complete");

        self.listeners.notify(
            ListenerCategory::ContentSwitch,
            &ContentSwitched {
                course_id: course_id.to_string(),
                part,
                animated: animate,
                sessions: created,
            },
        );
        self.emit(ContentEvent::SwitchCompleted {
            course_id: course_id.to_string(),
            part: part.as_str().to_string(),
            animated: animate,
        });

        Ok(if animate {
            SwitchOutcome::Animated
        } else {
            SwitchOutcome::Direct
        })
    }

    /// Create sessions for `part` and hand the pane to the view. Returns the
    /// number of sessions created.
    fn render(&self, course: &Course, part: Part) -> usize {
        let snapshots: Vec<_> = playable_audio(course, part)
            .into_iter()
            .map(|(audio_id, file)| self.sessions.create_session(&audio_id, &file).snapshot())
            .collect();
        self.view.render_content(&render_part(course, part, &snapshots));
        snapshots.len()
    }
}

impl std::fmt::Debug for ContentSwitcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentSwitcher")
            .field("switching", &self.is_switching())
            .field("transitions", &self.transitions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction() {
        assert_eq!(SwitchDirection::between(Some(Part::A), Part::B), SwitchDirection::Forward);
        assert_eq!(SwitchDirection::between(Some(Part::B), Part::A), SwitchDirection::Backward);
        assert_eq!(SwitchDirection::between(None, Part::A), SwitchDirection::Forward);
        assert_eq!(SwitchDirection::between(Some(Part::A), Part::A), SwitchDirection::Forward);
    }

    #[test]
    fn test_class_names() {
        assert_eq!(
            exit_class(AnimationKind::Slide, SwitchDirection::Backward),
            "content-slide-exit-left"
        );
        assert_eq!(
            enter_class(AnimationKind::Slide, SwitchDirection::Forward),
            "content-slide-enter-right"
        );
        assert_eq!(enter_class(AnimationKind::Fade, SwitchDirection::Forward), "content-fade-enter");
        assert_eq!(exit_class(AnimationKind::Flip, SwitchDirection::Backward), "content-flip-exit");
        assert_eq!(exit_class(AnimationKind::Scale, SwitchDirection::Forward), "content-scale-exit");
    }
}
