//! Startup sequence.

use core_async::Instant;
use core_runtime::config::AppConfig;
use core_runtime::logging::{init_logging, LoggingConfig};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::context::AppContext;
use crate::error::Result;
use crate::switcher::ContentView;

/// Build the context, load every course, draw the course list and restore
/// the route the page was opened with.
///
/// Courses that fail to load are dropped; an empty list is not an error.
/// Without a route only the first paragraph of the first course is warmed.
#[instrument(skip_all)]
pub async fn init_app(config: AppConfig, view: Arc<dyn ContentView>) -> Result<AppContext> {
    let started = Instant::now();
    let ctx = AppContext::new(config, view);

    let loaded = ctx.store().load().await;
    if loaded == 0 {
        warn!("No courses available");
    }
    ctx.refresh_course_list();

    match ctx.apply_initial_route().await {
        Ok(Some(outcome)) => info!(?outcome, "Restored route"),
        Ok(None) => ctx.schedule_preload(None),
        Err(e) => {
            warn!(error = %e, "Failed to restore route");
            ctx.schedule_preload(None);
        }
    }

    ctx.monitor().record_app_init(started.elapsed());
    info!(courses = loaded, "Application initialized");
    Ok(ctx)
}

/// Install the default subscriber for hosts that never configured one.
///
/// Returns `false` when a subscriber was already in place; the existing one
/// is kept.
pub fn init_host_logging(config: LoggingConfig) -> bool {
    match init_logging(config) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Keeping existing subscriber");
            false
        }
    }
}
