//! Speculative audio warming based on what the learner is likely to open next.

use core_content::{Course, ContentStore};
use core_runtime::config::PreloadConfig;
use std::sync::Arc;
use tracing::{debug, info};

use crate::loader::{LazyLoader, PreloadReport};
use crate::path::PathResolver;

pub struct PreloadStrategy {
    store: Arc<ContentStore>,
    loader: Arc<LazyLoader>,
    resolver: Arc<PathResolver>,
    config: PreloadConfig,
}

impl PreloadStrategy {
    pub fn new(
        store: Arc<ContentStore>,
        loader: Arc<LazyLoader>,
        resolver: Arc<PathResolver>,
        config: PreloadConfig,
    ) -> Self {
        Self {
            store,
            loader,
            resolver,
            config,
        }
    }

    fn resolved_audio(&self, course: &Course) -> Vec<String> {
        course
            .audio_paragraphs()
            .filter_map(|(_, paragraph)| paragraph.audio_file.as_deref())
            .filter_map(|file| self.resolver.resolve(file).ok())
            .collect()
    }

    /// Warm every audio file of both parts of `course`.
    pub async fn preload_course(&self, course: &Course) -> PreloadReport {
        let urls = self.resolved_audio(course);
        if urls.is_empty() {
            return PreloadReport::default();
        }
        debug!(course_id = %course.id, count = urls.len(), "Preloading course audio");
        self.loader.batch_preload(&urls).await
    }

    /// Warm the course listed after `course_id`, if any.
    pub async fn preload_next_course(&self, course_id: &str) -> Option<PreloadReport> {
        let next = self.store.next_course(course_id)?;
        info!(course_id = %next.id, "Preloading next course");
        Some(self.preload_course(&next).await)
    }

    /// Warm the selected course now and the following one after the
    /// configured delay. Without a selection only the first paragraph of the
    /// first course's Part A is warmed.
    ///
    /// Returns the report for the immediate part of the work.
    pub async fn intelligent_preload(self: &Arc<Self>, selected_course: Option<&str>) -> PreloadReport {
        if !self.config.enabled {
            return PreloadReport::default();
        }

        match selected_course {
            Some(course_id) => {
                let Some(course) = self.store.course(course_id) else {
                    return PreloadReport::default();
                };
                let report = self.preload_course(&course).await;

                let strategy = Arc::clone(self);
                let course_id = course_id.to_string();
                let delay = self.config.next_course_delay;
                let spawned = core_async::spawn_detached(async move {
                    core_async::sleep(delay).await;
                    strategy.preload_next_course(&course_id).await;
                });
                if !spawned {
                    debug!("No runtime for delayed preload; skipping next course");
                }
                report
            }
            None => {
                let first = self
                    .store
                    .first_course()
                    .and_then(|course| course.part_a.first().and_then(|p| p.audio_file.clone()));
                let Some(url) = first.and_then(|file| self.resolver.resolve(&file).ok()) else {
                    return PreloadReport::default();
                };
                let succeeded = usize::from(self.loader.preload(&url).await);
                PreloadReport {
                    requested: 1,
                    succeeded,
                    failed: 1 - succeeded,
                }
            }
        }
    }
}
