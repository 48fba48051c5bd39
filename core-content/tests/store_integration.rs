//! Content store loading against a mocked HTTP client.

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_content::{ContentStore, CourseStatus, Part};
use core_runtime::events::{ContentEvent, CoreEvent, EventBus};
use std::sync::Arc;

mockall::mock! {
    Http {}

    #[async_trait::async_trait]
    impl HttpClient for Http {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse>;
    }
}

const CLASS01: &str = r#"{
    "id": "Class01",
    "name": "第一课",
    "partA": [
        {"paragraph": 1, "originalText": "你好", "jyutping": "nei5 hou2",
         "audioFile": "Sound/Class01/a_1.opus"}
    ]
}"#;

const CLASS02_BROKEN: &str = r#"{"id": "Class02", "partA": []}"#;

fn mock_site() -> MockHttp {
    let mut http = MockHttp::new();
    http.expect_execute().returning(|request| {
        let body = match request.url.as_str() {
            "data/Class01/courses.json" => CLASS01,
            "data/Class02/courses.json" => CLASS02_BROKEN,
            "data/Class03/courses.json" => {
                return Err(BridgeError::Network("connection reset".into()))
            }
            _ => return Ok(HttpResponse::new(404, "not found")),
        };
        Ok(HttpResponse::new(200, body))
    });
    http
}

fn ids(ids: &[&str]) -> Vec<String> {
    ids.iter().map(|id| id.to_string()).collect()
}

#[core_async::test]
async fn load_keeps_valid_courses_and_drops_the_rest() {
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();

    let store = ContentStore::new(
        Arc::new(mock_site()),
        "data",
        ids(&["Class01", "Class02", "Class03", "Class04"]),
    )
    .with_events(bus);

    assert_eq!(store.load().await, 1);

    let course = store.course("Class01").expect("Class01 loaded");
    assert_eq!(course.part_a.len(), 1);
    assert_eq!(core_content::course_status(&course), CourseStatus::Complete);
    assert!(store.course("Class02").is_none());

    let mut rejected = Vec::new();
    let mut loaded = None;
    while let Ok(event) = events.try_recv() {
        match event {
            CoreEvent::Content(ContentEvent::CourseRejected { course_id, .. }) => {
                rejected.push(course_id)
            }
            CoreEvent::Content(ContentEvent::CoursesLoaded { count }) => loaded = Some(count),
            _ => {}
        }
    }
    assert_eq!(rejected, ids(&["Class02", "Class03", "Class04"]));
    assert_eq!(loaded, Some(1));
}

#[core_async::test]
async fn discover_reports_reachable_ids() {
    let store = ContentStore::new(
        Arc::new(mock_site()),
        "data",
        ids(&["Class01", "Class02", "Class03", "Class04"]),
    );

    assert_eq!(store.discover().await, ids(&["Class01", "Class02"]));
}

#[core_async::test]
async fn reload_replaces_previous_contents() {
    let store = ContentStore::new(Arc::new(mock_site()), "data", ids(&["Class01"]));
    store.load().await;
    store.load().await;

    assert_eq!(store.len(), 1);
    let stats = store.statistics();
    assert_eq!(stats.total_courses, 1);
    assert_eq!(stats.paragraphs_with_audio, 1);
    assert!(store.integrity_report().is_empty());
    assert_eq!(store.part_content("Class01", Part::A).unwrap().len(), 1);
}
