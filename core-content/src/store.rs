//! # Content Store
//!
//! Loads lesson JSON for the configured course ids and serves lookups.
//!
//! ## Loading
//!
//! Every known id is fetched from `<data_root>/<id>/courses.json` and
//! validated. A course that fails to fetch or validate is logged, reported
//! as [`ContentEvent::CourseRejected`] and dropped; the remaining courses
//! still load. Courses keep the order of the configured id list.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let store = ContentStore::from_config(&config).with_events(bus.clone());
//! store.load().await;
//!
//! if let Some(course) = store.course("Class01") {
//!     let paragraphs = store.part_content("Class01", Part::A)?;
//! }
//! ```

use bridge_traits::http::HttpClient;
use core_runtime::config::AppConfig;
use core_runtime::events::{ContentEvent, CoreEvent, EventBus};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{ContentError, Result};
use crate::models::{Course, Paragraph, Part};
use crate::stats::{CourseStatistics, IntegrityIssue};
use crate::validation::validate_course;

pub struct ContentStore {
    http: Arc<dyn HttpClient>,
    data_root: String,
    known_courses: Vec<String>,
    courses: RwLock<Vec<Arc<Course>>>,
    events: Option<EventBus>,
}

impl ContentStore {
    pub fn new(
        http: Arc<dyn HttpClient>,
        data_root: impl Into<String>,
        known_courses: Vec<String>,
    ) -> Self {
        Self {
            http,
            data_root: data_root.into(),
            known_courses,
            courses: RwLock::new(Vec::new()),
            events: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::clone(&config.http_client),
            config.data_root.clone(),
            config.known_courses.clone(),
        )
    }

    /// Publish load results on `events`.
    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Seed the store with already validated courses.
    pub fn with_courses(self, courses: Vec<Course>) -> Self {
        *self.courses.write() = courses.into_iter().map(Arc::new).collect();
        self
    }

    fn course_url(&self, course_id: &str) -> String {
        format!("{}/{}/courses.json", self.data_root.trim_end_matches('/'), course_id)
    }

    fn emit(&self, event: ContentEvent) {
        if let Some(events) = &self.events {
            // No subscribers is fine.
            let _ = events.emit(CoreEvent::Content(event));
        }
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Known course ids whose data file is reachable.
    #[instrument(skip(self))]
    pub async fn discover(&self) -> Vec<String> {
        let mut found = Vec::new();
        for id in &self.known_courses {
            if self.http.exists(&self.course_url(id)).await {
                found.push(id.clone());
            } else {
                debug!(course_id = %id, "Course data not found");
            }
        }
        info!(count = found.len(), "Course discovery finished");
        found
    }

    /// Fetch and validate a single course without storing it.
    pub async fn fetch_course(&self, course_id: &str) -> Result<Course> {
        let url = self.course_url(course_id);
        let value = self
            .http
            .get_json(&url)
            .await
            .map_err(|source| ContentError::Fetch {
                course_id: course_id.to_string(),
                source,
            })?;

        let course = validate_course(course_id, &value)?;
        if course.id != course_id {
            warn!(
                requested = %course_id,
                declared = %course.id,
                "Course file declares a different id"
            );
        }
        Ok(course)
    }

    /// Load every known course, replacing the current contents.
    ///
    /// Returns the number of courses kept.
    #[instrument(skip(self), fields(known = self.known_courses.len()))]
    pub async fn load(&self) -> usize {
        let mut loaded = Vec::with_capacity(self.known_courses.len());

        for id in &self.known_courses {
            match self.fetch_course(id).await {
                Ok(course) => {
                    debug!(
                        course_id = %course.id,
                        paragraphs = course.paragraph_count(),
                        "Course loaded"
                    );
                    loaded.push(Arc::new(course));
                }
                Err(e) => {
                    warn!(course_id = %id, error = %e, "Dropping course");
                    self.emit(ContentEvent::CourseRejected {
                        course_id: id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let count = loaded.len();
        *self.courses.write() = loaded;

        for issue in self.integrity_report() {
            warn!(%issue, "Content integrity issue");
        }

        info!(count, "Courses loaded");
        self.emit(ContentEvent::CoursesLoaded { count });
        count
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    pub fn courses(&self) -> Vec<Arc<Course>> {
        self.courses.read().clone()
    }

    pub fn len(&self) -> usize {
        self.courses.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.courses.read().is_empty()
    }

    pub fn course(&self, course_id: &str) -> Option<Arc<Course>> {
        self.courses
            .read()
            .iter()
            .find(|course| course.id == course_id)
            .cloned()
    }

    pub fn first_course(&self) -> Option<Arc<Course>> {
        self.courses.read().first().cloned()
    }

    /// Paragraphs of one part. An empty part yields an empty list.
    pub fn part_content(&self, course_id: &str, part: Part) -> Result<Vec<Paragraph>> {
        self.course(course_id)
            .map(|course| course.part(part).to_vec())
            .ok_or_else(|| ContentError::NotFound(course_id.to_string()))
    }

    /// Whether `(course_id, part)` names a course with content in that part.
    pub fn has_content(&self, course_id: &str, part: Part) -> bool {
        self.course(course_id)
            .is_some_and(|course| course.has_part(part))
    }

    /// The course after `course_id` in load order.
    pub fn next_course(&self, course_id: &str) -> Option<Arc<Course>> {
        let courses = self.courses.read();
        let index = courses.iter().position(|course| course.id == course_id)?;
        courses.get(index + 1).cloned()
    }

    pub fn statistics(&self) -> CourseStatistics {
        let courses = self.courses.read();
        CourseStatistics::collect(courses.iter().map(|course| course.as_ref()))
    }

    pub fn integrity_report(&self) -> Vec<IntegrityIssue> {
        self.courses
            .read()
            .iter()
            .flat_map(|course| IntegrityIssue::scan(course))
            .collect()
    }
}

impl std::fmt::Debug for ContentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStore")
            .field("data_root", &self.data_root)
            .field("known_courses", &self.known_courses)
            .field("loaded", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::http::{HttpRequest, HttpResponse};

    struct NoHttp;

    #[async_trait]
    impl HttpClient for NoHttp {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            Ok(HttpResponse::new(404, format!("no {}", request.url)))
        }
    }

    fn seeded() -> ContentStore {
        ContentStore::new(Arc::new(NoHttp), "data", vec![]).with_courses(vec![
            Course::new("Class01", "第一课")
                .with_part(Part::A, vec![Paragraph::new(1, "你好", "nei5 hou2")]),
            Course::new("Class02", "第二课")
                .with_part(Part::B, vec![Paragraph::new(1, "早晨", "zou2 san4")]),
        ])
    }

    #[test]
    fn test_lookups() {
        let store = seeded();
        assert_eq!(store.len(), 2);
        assert_eq!(store.course("Class02").map(|c| c.name.clone()).as_deref(), Some("第二课"));
        assert!(store.course("Class09").is_none());
        assert!(store.has_content("Class01", Part::A));
        assert!(!store.has_content("Class01", Part::B));
        assert!(store.part_content("Class01", Part::B).unwrap().is_empty());
        assert!(matches!(
            store.part_content("Class09", Part::A),
            Err(ContentError::NotFound(_))
        ));
    }

    #[test]
    fn test_next_course() {
        let store = seeded();
        assert_eq!(store.next_course("Class01").map(|c| c.id.clone()).as_deref(), Some("Class02"));
        assert!(store.next_course("Class02").is_none());
        assert!(store.next_course("missing").is_none());
    }

    #[test]
    fn test_course_url_trims_slash() {
        let store = ContentStore::new(Arc::new(NoHttp), "data/", vec![]);
        assert_eq!(store.course_url("Class01"), "data/Class01/courses.json");
    }
}
