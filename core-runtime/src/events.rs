//! # Event System
//!
//! Two complementary delivery mechanisms:
//!
//! - [`EventBus`]: asynchronous fan-out over `tokio::sync::broadcast` of typed
//!   [`CoreEvent`]s. Hosts and background tasks subscribe to observe what the
//!   core is doing (selection changes, playback state, content switches).
//! - [`StateListeners`]: synchronous, in-order callbacks grouped by
//!   [`ListenerCategory`]. A panicking listener is caught and logged; the
//!   remaining listeners still run.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   emit    ┌───────────┐   subscribe   ┌────────────┐
//! │ Navigation   ├──────────>│           ├──────────────>│ Host UI    │
//! └──────────────┘           │ EventBus  │               └────────────┘
//! ┌──────────────┐   emit    │ (broadcast│   subscribe   ┌────────────┐
//! │ Playback     ├──────────>│  channel) ├──────────────>│ Analytics  │
//! └──────────────┘           │           │               └────────────┘
//! ┌──────────────┐   emit    │           │
//! │ Content      ├──────────>│           │
//! └──────────────┘           └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::events::{CoreEvent, EventBus, NavigationEvent};
//!
//! let bus = EventBus::new(100);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Navigation(NavigationEvent::SelectionChanged {
//!     course_id: "Class01".into(),
//!     part: "A".into(),
//! })).ok();
//! ```
//!
//! Emitting with no subscribers returns `Err`; callers inside the core ignore
//! that result because observers are optional.

use core_async::sync::broadcast;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::error;

pub use core_async::sync::broadcast::error::{RecvError, SendError};
pub use core_async::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Navigation(NavigationEvent),
    Playback(PlaybackEvent),
    Content(ContentEvent),
}

impl CoreEvent {
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Navigation(e) => e.description(),
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Content(e) => e.description(),
        }
    }

    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Error,
            CoreEvent::Content(ContentEvent::CourseRejected { .. }) => EventSeverity::Warning,
            CoreEvent::Content(ContentEvent::CoursesLoaded { .. }) => EventSeverity::Info,
            CoreEvent::Content(ContentEvent::SwitchCompleted { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    Debug,
    Info,
    Warning,
    Error,
}

// ============================================================================
// Navigation Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum NavigationEvent {
    /// Selection committed through the mutator.
    SelectionChanged { course_id: String, part: String },
    /// Selection reset to unset.
    SelectionCleared,
    /// A location change was replayed into the selection.
    RouteApplied { course_id: String, part: String },
    /// The address bar route was removed (unknown course or cleared selection).
    RouteCleared,
}

impl NavigationEvent {
    fn description(&self) -> &str {
        match self {
            NavigationEvent::SelectionChanged { .. } => "Selection changed",
            NavigationEvent::SelectionCleared => "Selection cleared",
            NavigationEvent::RouteApplied { .. } => "Route applied",
            NavigationEvent::RouteCleared => "Route cleared",
        }
    }
}

// ============================================================================
// Playback Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    Loading { audio_id: String },
    Started { audio_id: String },
    Paused { audio_id: String },
    Stopped { audio_id: String },
    /// Reached the end of the clip.
    Finished { audio_id: String },
    Error {
        audio_id: String,
        message: String,
        /// A retry may succeed (network and timeout failures).
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::Loading { .. } => "Audio loading",
            PlaybackEvent::Started { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Stopped { .. } => "Playback stopped",
            PlaybackEvent::Finished { .. } => "Playback finished",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Content Events
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum ContentEvent {
    CoursesLoaded { count: usize },
    CourseRejected { course_id: String, reason: String },
    SwitchStarted { course_id: String, part: String },
    SwitchCompleted {
        course_id: String,
        part: String,
        animated: bool,
    },
}

impl ContentEvent {
    fn description(&self) -> &str {
        match self {
            ContentEvent::CoursesLoaded { .. } => "Courses loaded",
            ContentEvent::CourseRejected { .. } => "Course rejected",
            ContentEvent::SwitchStarted { .. } => "Content switch started",
            ContentEvent::SwitchCompleted { .. } => "Content switch completed",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus. Clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event. Returns the number of receivers, or an error when
    /// nobody is subscribed.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// Receiver with an optional predicate.
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }

    /// Next event passing the filter.
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged(n)` when the subscriber fell behind, `RecvError::Closed`
    /// once every sender is gone.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv). `None` when drained.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Synchronous listeners
// ============================================================================

/// Listener groups notified by the selection state and the content switcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListenerCategory {
    CourseChange,
    PartChange,
    StateChange,
    ContentSwitch,
}

impl ListenerCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListenerCategory::CourseChange => "courseChange",
            ListenerCategory::PartChange => "partChange",
            ListenerCategory::StateChange => "stateChange",
            ListenerCategory::ContentSwitch => "contentSwitch",
        }
    }
}

/// Handle returned by [`StateListeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Registration<E> {
    id: ListenerId,
    category: ListenerCategory,
    callback: Listener<E>,
}

/// Synchronous callback registry keyed by [`ListenerCategory`].
///
/// Delivery happens on the notifying thread in registration order. The
/// registry lock is released before callbacks run, so a listener may
/// subscribe or unsubscribe from inside its callback.
pub struct StateListeners<E> {
    next_id: AtomicU64,
    registrations: Mutex<Vec<Registration<E>>>,
}

impl<E> StateListeners<E> {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            registrations: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe<F>(&self, category: ListenerCategory, callback: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registrations.lock().push(Registration {
            id,
            category,
            callback: Arc::new(callback),
        });
        id
    }

    /// Returns `false` when `id` was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut registrations = self.registrations.lock();
        let before = registrations.len();
        registrations.retain(|registration| registration.id != id);
        registrations.len() != before
    }

    pub fn count(&self, category: ListenerCategory) -> usize {
        self.registrations
            .lock()
            .iter()
            .filter(|registration| registration.category == category)
            .count()
    }

    /// Deliver `event` to every listener of `category`. Returns how many
    /// listeners completed without panicking.
    pub fn notify(&self, category: ListenerCategory, event: &E) -> usize {
        let callbacks: Vec<(ListenerId, Listener<E>)> = self
            .registrations
            .lock()
            .iter()
            .filter(|registration| registration.category == category)
            .map(|registration| (registration.id, Arc::clone(&registration.callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in callbacks {
            match catch_unwind(AssertUnwindSafe(|| callback(event))) {
                Ok(()) => delivered += 1,
                Err(_) => {
                    error!(
                        category = category.as_str(),
                        listener = id.0,
                        "State listener panicked"
                    );
                }
            }
        }
        delivered
    }
}

impl<E> Default for StateListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for StateListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateListeners")
            .field("registrations", &self.registrations.lock().len())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn selection(course_id: &str, part: &str) -> CoreEvent {
        CoreEvent::Navigation(NavigationEvent::SelectionChanged {
            course_id: course_id.to_string(),
            part: part.to_string(),
        })
    }

    #[core_async::test]
    async fn test_emit_without_subscribers_is_err() {
        let bus = EventBus::new(10);
        assert_eq!(bus.subscriber_count(), 0);
        assert!(bus.emit(selection("Class01", "A")).is_err());
    }

    #[core_async::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut sub1 = bus.subscribe();
        let mut sub2 = bus.subscribe();

        let event = selection("Class02", "B");
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(sub1.recv().await.unwrap(), event);
        assert_eq!(sub2.recv().await.unwrap(), event);
    }

    #[core_async::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Playback(_)));

        bus.emit(selection("Class01", "A")).ok();
        let playback = CoreEvent::Playback(PlaybackEvent::Started {
            audio_id: "part-a-Class01-1".to_string(),
        });
        bus.emit(playback.clone()).ok();

        assert_eq!(stream.recv().await.unwrap(), playback);
    }

    #[core_async::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();

        for i in 0..5 {
            bus.emit(CoreEvent::Content(ContentEvent::CoursesLoaded { count: i }))
                .ok();
        }

        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_try_recv_empty_and_filtered() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Content(_)));

        assert!(stream.try_recv().is_none());

        bus.emit(selection("Class01", "A")).ok();
        assert!(stream.try_recv().is_none());
    }

    #[test]
    fn test_severity_and_description() {
        let error = CoreEvent::Playback(PlaybackEvent::Error {
            audio_id: "part-a-Class01-1".to_string(),
            message: "network error".to_string(),
            recoverable: true,
        });
        assert_eq!(error.severity(), EventSeverity::Error);
        assert_eq!(error.description(), "Playback error");

        let rejected = CoreEvent::Content(ContentEvent::CourseRejected {
            course_id: "Class09".to_string(),
            reason: "missing name".to_string(),
        });
        assert_eq!(rejected.severity(), EventSeverity::Warning);
        assert_eq!(
            CoreEvent::Navigation(NavigationEvent::RouteCleared).severity(),
            EventSeverity::Debug
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::Content(ContentEvent::SwitchCompleted {
            course_id: "Class01".to_string(),
            part: "B".to_string(),
            animated: true,
        });

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("SwitchCompleted"));
        let back: CoreEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_listeners_in_registration_order() {
        let listeners: StateListeners<u32> = StateListeners::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second"] {
            let seen = Arc::clone(&seen);
            listeners.subscribe(ListenerCategory::StateChange, move |value: &u32| {
                seen.lock().push((tag, *value));
            });
        }
        let other = Arc::clone(&seen);
        listeners.subscribe(ListenerCategory::CourseChange, move |_| {
            other.lock().push(("course", 0));
        });

        assert_eq!(listeners.notify(ListenerCategory::StateChange, &7), 2);
        assert_eq!(*seen.lock(), vec![("first", 7), ("second", 7)]);
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let listeners: StateListeners<()> = StateListeners::new();
        let calls = Arc::new(AtomicUsize::new(0));

        listeners.subscribe(ListenerCategory::PartChange, |_| panic!("listener bug"));
        let counter = Arc::clone(&calls);
        listeners.subscribe(ListenerCategory::PartChange, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(listeners.notify(ListenerCategory::PartChange, &()), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let listeners: StateListeners<()> = StateListeners::new();
        let id = listeners.subscribe(ListenerCategory::ContentSwitch, |_| {});
        assert_eq!(listeners.count(ListenerCategory::ContentSwitch), 1);

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        assert_eq!(listeners.notify(ListenerCategory::ContentSwitch, &()), 0);
    }
}
