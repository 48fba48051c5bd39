//! End-to-end flows through `AppContext` with in-memory hosts.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::location::{NavigationHistory, PageLocation, RouteState};
use bridge_traits::media::{
    MediaBackend, MediaElement, MediaErrorCode, MediaEvent, MediaListener, PlayRejection,
    ReadyState,
};
use bridge_traits::time::ManualClock;
use core_navigation::NavigationError;
use core_playback::SessionState;
use core_runtime::config::AppConfig;
use core_runtime::events::{ContentEvent, CoreEvent, ListenerCategory};
use core_service::{
    init_app, BreadcrumbView, ContentPaneView, ContentView, CoreError, CourseListView,
    ParagraphAudio, SwitchOutcome,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Hosts
// ============================================================================

mockall::mock! {
    Http {}

    #[async_trait::async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

const CLASS01: &str = r#"{
    "id": "Class01",
    "name": "第一课",
    "partA": [
        {"paragraph": 1, "originalText": "你好", "jyutping": "nei5 hou2",
         "audioFile": "Sound/Class01/a_1.opus"}
    ],
    "partB": [
        {"paragraph": 1, "originalText": "早晨", "jyutping": "zou2 san4",
         "audioFile": "Sound/Class01/b_1.opus"},
        {"paragraph": 2, "originalText": "多谢", "jyutping": "do1 ze6"}
    ]
}"#;

const CLASS02: &str = r#"{
    "id": "Class02",
    "name": "第二课",
    "partA": [
        {"paragraph": 1, "originalText": "食饭", "jyutping": "sik6 faan6",
         "audioFile": "Sound/Class02/a_1.opus"}
    ]
}"#;

fn site(courses: &'static [(&'static str, &'static str)]) -> MockHttp {
    let mut http = MockHttp::new();
    http.expect_execute().returning(move |request| {
        let found = courses
            .iter()
            .find(|(id, _)| request.url == format!("data/{}/courses.json", id));
        Ok(match found {
            Some((_, body)) => HttpResponse::new(200, *body),
            None => HttpResponse::new(404, "not found"),
        })
    });
    http
}

#[derive(Default)]
struct Element {
    source: Mutex<Option<String>>,
    time: Mutex<f64>,
    listener: Mutex<Option<MediaListener>>,
}

#[async_trait]
impl MediaElement for Element {
    fn set_source(&self, url: &str) {
        *self.source.lock() = Some(url.to_string());
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener(MediaEvent::CanPlay);
        }
    }
    fn source(&self) -> Option<String> {
        self.source.lock().clone()
    }
    fn clear_source(&self) {
        *self.source.lock() = None;
    }
    fn ready_state(&self) -> ReadyState {
        if self.source.lock().is_some() {
            ReadyState::HaveEnoughData
        } else {
            ReadyState::HaveNothing
        }
    }
    async fn play(&self) -> Result<(), PlayRejection> {
        Ok(())
    }
    fn pause(&self) {}
    fn current_time(&self) -> f64 {
        *self.time.lock()
    }
    fn set_current_time(&self, seconds: f64) {
        *self.time.lock() = seconds;
    }
    fn duration(&self) -> Option<f64> {
        Some(20.0)
    }
    fn volume(&self) -> f64 {
        1.0
    }
    fn set_volume(&self, _volume: f64) {}
    fn muted(&self) -> bool {
        false
    }
    fn set_muted(&self, _muted: bool) {}
    fn error_code(&self) -> Option<MediaErrorCode> {
        None
    }
    fn set_listener(&self, listener: Option<MediaListener>) {
        *self.listener.lock() = listener;
    }
}

#[derive(Default)]
struct Backend {
    prefetched: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaBackend for Backend {
    fn create_element(&self) -> Arc<dyn MediaElement> {
        Arc::new(Element::default())
    }

    async fn prefetch(&self, url: &str) -> BridgeResult<()> {
        self.prefetched.lock().push(url.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct History {
    hash: Mutex<String>,
    pushes: AtomicUsize,
}

impl NavigationHistory for History {
    fn location(&self) -> PageLocation {
        PageLocation::local().with_hash(self.hash.lock().clone())
    }

    fn push(&self, _state: Option<&RouteState>, hash: &str) -> BridgeResult<()> {
        *self.hash.lock() = hash.to_string();
        self.pushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingView {
    transitions: Mutex<Vec<Option<String>>>,
    contents: Mutex<Vec<ContentPaneView>>,
    breadcrumbs: Mutex<Vec<BreadcrumbView>>,
    course_lists: Mutex<Vec<CourseListView>>,
}

impl RecordingView {
    fn last_content(&self) -> ContentPaneView {
        self.contents.lock().last().cloned().expect("content rendered")
    }
}

impl ContentView for RecordingView {
    fn show_transition(&self, class_name: Option<&str>) {
        self.transitions.lock().push(class_name.map(str::to_string));
    }

    fn render_content(&self, view: &ContentPaneView) {
        self.contents.lock().push(view.clone());
    }

    fn render_breadcrumb(&self, view: &BreadcrumbView) {
        self.breadcrumbs.lock().push(view.clone());
    }

    fn render_course_list(&self, view: &CourseListView) {
        self.course_lists.lock().push(view.clone());
    }
}

struct Harness {
    view: Arc<RecordingView>,
    history: Arc<History>,
    backend: Arc<Backend>,
}

fn config(courses: &'static [(&'static str, &'static str)], hash: &str) -> (AppConfig, Harness) {
    let view = Arc::new(RecordingView::default());
    let history = Arc::new(History::default());
    *history.hash.lock() = hash.to_string();
    let backend = Arc::new(Backend::default());

    let config = AppConfig::builder()
        .http_client(Arc::new(site(courses)))
        .media_backend(backend.clone())
        .history(history.clone())
        .clock(Arc::new(ManualClock::default()))
        .build()
        .unwrap();
    (config, Harness { view, history, backend })
}

const BOTH: &[(&str, &str)] = &[("Class01", CLASS01), ("Class02", CLASS02)];

// ============================================================================
// Tests
// ============================================================================

#[core_async::test]
async fn class01_part_a_renders_one_stopped_session() {
    let (config, harness) = config(BOTH, "");
    let app = init_app(config, harness.view.clone()).await.unwrap();

    let outcome = app.select("Class01", "A").await.unwrap();
    assert_eq!(outcome, SwitchOutcome::Direct);

    let ContentPaneView::Paragraphs { paragraphs, .. } = harness.view.last_content() else {
        panic!("expected paragraphs");
    };
    assert_eq!(paragraphs.len(), 1);
    assert!(matches!(paragraphs[0].audio, ParagraphAudio::Controls { .. }));

    let sessions = app.sessions().sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].id(), "part-a-Class01-1");
    assert_eq!(sessions[0].state(), SessionState::Stopped);
    let resolved = app.sessions().resolver().resolve(sessions[0].audio_file()).unwrap();
    assert!(resolved.ends_with("Sound/Class01/a_1.opus"));

    assert_eq!(harness.history.location().hash, "#Class01/A");
    assert_eq!(
        harness.view.breadcrumbs.lock().last().unwrap().course_name,
        "第一课"
    );
}

#[core_async::test(start_paused = true)]
async fn part_change_animates_and_notifies() {
    let (config, harness) = config(BOTH, "");
    let app = init_app(config, harness.view.clone()).await.unwrap();
    let mut events = app.events().subscribe();
    let switched = Arc::new(AtomicUsize::new(0));
    let counter = switched.clone();
    app.switcher()
        .listeners()
        .subscribe(ListenerCategory::ContentSwitch, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    app.select("Class01", "A").await.unwrap();
    let outcome = app.select("Class01", "B").await.unwrap();
    assert_eq!(outcome, SwitchOutcome::Animated);

    let transitions = harness.view.transitions.lock().clone();
    assert_eq!(
        transitions,
        vec![
            Some("content-fade-exit".to_string()),
            None,
            Some("content-fade-enter".to_string()),
            None,
        ]
    );
    assert_eq!(switched.load(Ordering::SeqCst), 2);
    assert_eq!(app.performance_report().total_content_switches, 2);

    // Part B has one paragraph with audio and one without.
    assert_eq!(app.sessions().len(), 1);
    assert!(app.sessions().session("part-b-Class01-1").is_some());

    let mut completed = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let CoreEvent::Content(ContentEvent::SwitchCompleted { part, animated, .. }) = event {
            completed.push((part, animated));
        }
    }
    assert_eq!(completed, vec![("A".to_string(), false), ("B".to_string(), true)]);
}

#[core_async::test(start_paused = true)]
async fn second_request_during_switch_is_ignored() {
    let (config, harness) = config(BOTH, "");
    let app = init_app(config, harness.view.clone()).await.unwrap();
    app.select("Class01", "A").await.unwrap();

    let (first, second) = futures::join!(app.select("Class01", "B"), app.select("Class02", "A"));

    assert_eq!(first.unwrap(), SwitchOutcome::Animated);
    assert_eq!(second.unwrap(), SwitchOutcome::Ignored);
    assert_eq!(
        app.selection().current().map(|s| s.course_id),
        Some("Class01".to_string())
    );
}

#[core_async::test(start_paused = true)]
async fn location_change_during_switch_is_ignored() {
    let (config, harness) = config(BOTH, "");
    let app = init_app(config, harness.view.clone()).await.unwrap();
    app.select("Class01", "A").await.unwrap();
    let history_len = app.selection().history().len();

    let state = RouteState {
        course_id: "Class02".into(),
        part: "A".into(),
    };
    let (first, second) = futures::join!(
        app.select("Class01", "B"),
        app.on_location_change(Some(&state))
    );

    assert_eq!(first.unwrap(), SwitchOutcome::Animated);
    assert_eq!(second.unwrap(), Some(SwitchOutcome::Ignored));

    let current = app.selection().current().unwrap();
    assert_eq!(current.course_id, "Class01");
    assert_eq!(current.part.as_str(), "B");
    assert_eq!(app.selection().history().len(), history_len + 1);
    let ids: Vec<String> = app
        .sessions()
        .sessions()
        .iter()
        .map(|session| session.id().to_string())
        .collect();
    assert_eq!(ids, vec!["part-b-Class01-1".to_string()]);
}

#[core_async::test]
async fn invalid_selection_changes_nothing() {
    let (config, harness) = config(BOTH, "");
    let app = init_app(config, harness.view.clone()).await.unwrap();
    app.select("Class01", "A").await.unwrap();
    let rendered = harness.view.contents.lock().len();

    let err = app.select("Class02", "B").await.unwrap_err();
    assert!(matches!(
        err,
        CoreError::Navigation(NavigationError::EmptyPart { .. })
    ));
    assert_eq!(app.selection().current().unwrap().course_id, "Class01");
    assert_eq!(harness.view.contents.lock().len(), rendered);
    assert_eq!(harness.history.location().hash, "#Class01/A");
}

#[core_async::test]
async fn initial_route_is_restored_without_push() {
    let (config, harness) = config(BOTH, "#Class01/B");
    let app = init_app(config, harness.view.clone()).await.unwrap();

    let current = app.selection().current().unwrap();
    assert_eq!(current.course_id, "Class01");
    assert_eq!(current.part.as_str(), "B");
    assert_eq!(harness.history.pushes.load(Ordering::SeqCst), 0);
    assert!(matches!(
        harness.view.last_content(),
        ContentPaneView::Paragraphs { .. }
    ));
}

#[core_async::test]
async fn unknown_initial_route_is_cleared() {
    let (config, harness) = config(BOTH, "#Class42/A");
    let app = init_app(config, harness.view.clone()).await.unwrap();

    assert!(app.selection().current().is_none());
    assert_eq!(harness.history.location().hash, "");
    assert!(harness.view.contents.lock().is_empty());
}

#[core_async::test]
async fn back_navigation_replays_route() {
    let (config, harness) = config(BOTH, "");
    let app = init_app(config, harness.view.clone()).await.unwrap();
    app.select("Class01", "A").await.unwrap();
    app.select("Class02", "A").await.unwrap();
    let pushes = harness.history.pushes.load(Ordering::SeqCst);

    let state = RouteState {
        course_id: "Class01".into(),
        part: "A".into(),
    };
    let outcome = app.on_location_change(Some(&state)).await.unwrap();

    assert!(outcome.is_some());
    assert_eq!(app.selection().current().unwrap().course_id, "Class01");
    assert_eq!(harness.history.pushes.load(Ordering::SeqCst), pushes);
}

#[core_async::test]
async fn empty_site_renders_empty_list() {
    let (config, harness) = config(&[], "");
    let app = init_app(config, harness.view.clone()).await.unwrap();

    assert!(app.store().is_empty());
    assert!(matches!(
        harness.view.course_lists.lock().last(),
        Some(CourseListView::Empty { .. })
    ));
    assert_eq!(app.statistics().total_courses, 0);
}

#[core_async::test]
async fn keyboard_and_visibility_drive_sessions() {
    let (config, harness) = config(BOTH, "");
    let app = init_app(config, harness.view.clone()).await.unwrap();
    app.select("Class01", "A").await.unwrap();

    assert_eq!(app.handle_key("Space", false).await.as_deref(), Some("▶️ 开始播放"));
    let session = app.sessions().session("part-a-Class01-1").unwrap();
    assert_eq!(session.state(), SessionState::Playing);
    assert!(harness
        .backend
        .prefetched
        .lock()
        .iter()
        .any(|url| url.ends_with("Sound/Class01/a_1.opus")));

    assert_eq!(app.handle_key("Space", true).await, None);

    assert_eq!(app.page_hidden(), 1);
    assert_eq!(session.state(), SessionState::Paused);
    assert_eq!(app.page_visible().await, 1);
    assert_eq!(session.state(), SessionState::Playing);

    assert_eq!(
        app.handle_key("Escape", false).await.as_deref(),
        Some("⏹️ 已停止 1 个音频")
    );

    app.clear_selection();
    assert!(app.sessions().is_empty());
    assert_eq!(harness.history.location().hash, "");
}
