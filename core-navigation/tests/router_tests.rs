//! Router behaviour against an in-memory history host.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::location::{NavigationHistory, PageLocation, RouteState};
use bridge_traits::time::ManualClock;
use core_content::{ContentStore, Course, Paragraph, Part};
use core_navigation::{Route, Router, Selection, SelectionState};
use core_runtime::events::{CoreEvent, EventBus, NavigationEvent};
use parking_lot::Mutex;
use std::sync::Arc;

mockall::mock! {
    Http {}

    #[async_trait::async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

#[derive(Default)]
struct FakeHistory {
    hash: Mutex<String>,
    pushes: Mutex<Vec<(Option<RouteState>, String)>>,
}

impl FakeHistory {
    fn edit_hash(&self, hash: &str) {
        *self.hash.lock() = hash.to_string();
    }

    fn push_count(&self) -> usize {
        self.pushes.lock().len()
    }
}

impl NavigationHistory for FakeHistory {
    fn location(&self) -> PageLocation {
        PageLocation::local().with_hash(self.hash.lock().clone())
    }

    fn push(&self, state: Option<&RouteState>, hash: &str) -> BridgeResult<()> {
        *self.hash.lock() = hash.to_string();
        self.pushes.lock().push((state.cloned(), hash.to_string()));
        Ok(())
    }
}

fn router(enabled: bool) -> (Router, Arc<FakeHistory>) {
    let courses = vec![
        Course::new("Class01", "第一课")
            .with_part(Part::A, vec![Paragraph::new(1, "你好", "nei5 hou2")])
            .with_part(Part::B, vec![Paragraph::new(1, "早晨", "zou2 san4")]),
        Course::new("Class02", "第二课")
            .with_part(Part::A, vec![Paragraph::new(1, "食饭", "sik6 faan6")]),
    ];
    let store = ContentStore::new(Arc::new(MockHttp::new()), "data", Vec::new()).with_courses(courses);
    let selection = SelectionState::new(Arc::new(store), Arc::new(ManualClock::default()), 10);
    let history = Arc::new(FakeHistory::default());
    let router = Router::new(Arc::new(selection), Some(history.clone()), enabled);
    (router, history)
}

#[test]
fn navigate_pushes_route() {
    let (router, history) = router(true);

    router.navigate("Class01", "B", true).unwrap();

    let pushes = history.pushes.lock().clone();
    assert_eq!(pushes.len(), 1);
    assert_eq!(pushes[0].1, "#Class01/B");
    assert_eq!(pushes[0].0.as_ref().unwrap().course_id, "Class01");
    assert_eq!(router.current_route(), Some(Route::new("Class01", Part::B)));
}

#[test]
fn invalid_navigation_pushes_nothing() {
    let (router, history) = router(true);

    assert!(router.navigate("Class02", "B", true).is_err());
    assert_eq!(history.push_count(), 0);
    assert_eq!(router.selection().current(), None);
}

#[test]
fn hash_edit_is_replayed_without_push() {
    let (router, history) = router(true);
    history.edit_hash("#Class02/A");

    let applied = router.on_location_change(None);

    assert_eq!(applied, Some(Selection::new("Class02", Part::A)));
    assert_eq!(history.push_count(), 0);
}

#[test]
fn popstate_state_wins_over_hash() {
    let (router, history) = router(true);
    history.edit_hash("#Class02/A");
    let state = RouteState {
        course_id: "Class01".into(),
        part: "B".into(),
    };

    let applied = router.on_location_change(Some(&state));

    assert_eq!(applied, Some(Selection::new("Class01", Part::B)));
    assert_eq!(history.push_count(), 0);
}

#[test]
fn unknown_course_clears_route() {
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let (router, history) = router(true);
    let router = router.with_events(bus);
    history.edit_hash("#Class99/A");

    assert_eq!(router.on_location_change(None), None);
    assert_eq!(history.location().hash, "");
    assert_eq!(history.push_count(), 1);
    assert_eq!(
        events.try_recv().unwrap(),
        CoreEvent::Navigation(NavigationEvent::RouteCleared)
    );
}

#[test]
fn malformed_route_is_ignored() {
    let (router, history) = router(true);
    history.edit_hash("#Class01/C");

    assert_eq!(router.apply_initial_route(), None);
    assert_eq!(history.push_count(), 0);
}

#[test]
fn clear_resets_selection_and_route() {
    let (router, history) = router(true);
    router.navigate("Class01", "A", true).unwrap();

    assert_eq!(router.clear(), Some(Selection::new("Class01", Part::A)));
    assert_eq!(router.selection().current(), None);
    assert_eq!(history.location().hash, "");
}

#[test]
fn disabled_routing_never_touches_history() {
    let (router, history) = router(false);
    history.edit_hash("#Class01/A");

    router.navigate("Class01", "B", true).unwrap();
    assert_eq!(router.on_location_change(None), None);
    router.clear();

    assert_eq!(history.push_count(), 0);
    assert!(!router.is_active());
}
