//! Load and switch latency tracking.

use bridge_traits::time::Clock;
use core_async::time::as_millis_f64;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const MAX_AUDIO_LOADS: usize = 100;
const MAX_CONTENT_SWITCHES: usize = 50;
const SLOW_INIT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    AudioLoad,
    ContentLoad,
    Network,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioLoadSample {
    pub path: String,
    pub millis: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSample {
    pub course_id: String,
    pub part: String,
    pub millis: f64,
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCounts {
    pub audio_load: u64,
    pub content_load: u64,
    pub network: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceReport {
    pub app_init_millis: f64,
    pub avg_audio_load_millis: f64,
    pub avg_content_switch_millis: f64,
    pub total_audio_loads: usize,
    pub total_content_switches: usize,
    pub error_counts: ErrorCounts,
}

#[derive(Default)]
struct Metrics {
    app_init_millis: f64,
    audio_loads: VecDeque<AudioLoadSample>,
    content_switches: VecDeque<SwitchSample>,
    errors: ErrorCounts,
}

/// Rolling window of the most recent audio loads (100) and content
/// switches (50), plus error counters.
pub struct PerformanceMonitor {
    clock: Arc<dyn Clock>,
    metrics: Mutex<Metrics>,
}

impl PerformanceMonitor {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            metrics: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_app_init(&self, elapsed: Duration) {
        let millis = as_millis_f64(elapsed);
        self.metrics.lock().app_init_millis = millis;
        if elapsed > SLOW_INIT {
            warn!(millis, "App initialisation took longer than 3s");
        } else {
            debug!(millis, "App initialised");
        }
    }

    pub fn record_audio_load(&self, path: &str, elapsed: Duration) {
        let sample = AudioLoadSample {
            path: path.to_string(),
            millis: as_millis_f64(elapsed),
            timestamp: self.clock.unix_timestamp_millis(),
        };
        debug!(path, millis = sample.millis, "Audio load");

        let mut metrics = self.metrics.lock();
        metrics.audio_loads.push_back(sample);
        while metrics.audio_loads.len() > MAX_AUDIO_LOADS {
            metrics.audio_loads.pop_front();
        }
    }

    pub fn record_content_switch(&self, course_id: &str, part: &str, elapsed: Duration) {
        let sample = SwitchSample {
            course_id: course_id.to_string(),
            part: part.to_string(),
            millis: as_millis_f64(elapsed),
            timestamp: self.clock.unix_timestamp_millis(),
        };
        debug!(course_id, part, millis = sample.millis, "Content switch");

        let mut metrics = self.metrics.lock();
        metrics.content_switches.push_back(sample);
        while metrics.content_switches.len() > MAX_CONTENT_SWITCHES {
            metrics.content_switches.pop_front();
        }
    }

    pub fn record_error(&self, category: ErrorCategory) {
        let mut metrics = self.metrics.lock();
        match category {
            ErrorCategory::AudioLoad => metrics.errors.audio_load += 1,
            ErrorCategory::ContentLoad => metrics.errors.content_load += 1,
            ErrorCategory::Network => metrics.errors.network += 1,
        }
    }

    pub fn audio_loads(&self) -> Vec<AudioLoadSample> {
        self.metrics.lock().audio_loads.iter().cloned().collect()
    }

    pub fn report(&self) -> PerformanceReport {
        let metrics = self.metrics.lock();
        PerformanceReport {
            app_init_millis: metrics.app_init_millis,
            avg_audio_load_millis: average(metrics.audio_loads.iter().map(|s| s.millis)),
            avg_content_switch_millis: average(metrics.content_switches.iter().map(|s| s.millis)),
            total_audio_loads: metrics.audio_loads.len(),
            total_content_switches: metrics.content_switches.len(),
            error_counts: metrics.errors,
        }
    }

    pub fn clear(&self) {
        *self.metrics.lock() = Metrics::default();
    }
}

fn average(values: impl ExactSizeIterator<Item = f64>) -> f64 {
    let count = values.len();
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::time::ManualClock;

    fn monitor() -> PerformanceMonitor {
        PerformanceMonitor::new(Arc::new(ManualClock::default()))
    }

    #[test]
    fn test_audio_window_is_bounded() {
        let monitor = monitor();
        for i in 0..120 {
            monitor.record_audio_load(&format!("a_{}.opus", i), Duration::from_millis(10));
        }

        let loads = monitor.audio_loads();
        assert_eq!(loads.len(), 100);
        assert_eq!(loads[0].path, "a_20.opus");
    }

    #[test]
    fn test_report_averages() {
        let monitor = monitor();
        monitor.record_audio_load("a", Duration::from_millis(100));
        monitor.record_audio_load("b", Duration::from_millis(300));
        for _ in 0..60 {
            monitor.record_content_switch("Class01", "A", Duration::from_millis(800));
        }
        monitor.record_error(ErrorCategory::AudioLoad);
        monitor.record_error(ErrorCategory::AudioLoad);

        let report = monitor.report();
        assert!((report.avg_audio_load_millis - 200.0).abs() < 1e-9);
        assert_eq!(report.total_content_switches, 50);
        assert_eq!(report.error_counts.audio_load, 2);

        monitor.clear();
        assert_eq!(monitor.report(), PerformanceReport::default());
    }
}
