//! Time-related abstractions.
//!
//! - On native platforms: Uses `tokio::time`, so paused test runtimes control
//!   every sleep, timeout and `Instant` in the crate graph.
//! - On WASM: Uses `gloo-timers` (`setTimeout`) and `performance.now()`.
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, Duration, Instant};
//!
//! async fn example() {
//!     let start = Instant::now();
//!     sleep(Duration::from_millis(300)).await;
//!     let _elapsed = start.elapsed();
//! }
//! ```

pub use std::time::Duration;

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::{error::Elapsed, sleep, timeout, Instant};

// ============================================================================
// WASM Implementation
// ============================================================================

/// Sleeps for the specified duration using the browser's `setTimeout`.
#[cfg(target_arch = "wasm32")]
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}

/// A monotonic instant backed by `performance.now()`.
///
/// The instant is relative to page load; if the Performance API is missing
/// every instant reads as zero and elapsed durations collapse to zero.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Instant {
    micros: u64,
}

#[cfg(target_arch = "wasm32")]
impl Instant {
    /// Returns the current instant.
    pub fn now() -> Self {
        let micros = web_sys::window()
            .and_then(|window| window.performance())
            .map(|performance| (performance.now() * 1000.0) as u64)
            .unwrap_or(0);
        Self { micros }
    }

    /// Returns the amount of time elapsed since this instant.
    pub fn elapsed(&self) -> Duration {
        Self::now().saturating_duration_since(*self)
    }

    /// Returns the duration since `earlier`, or zero if `earlier` is later.
    pub fn saturating_duration_since(&self, earlier: Instant) -> Duration {
        Duration::from_micros(self.micros.saturating_sub(earlier.micros))
    }
}

/// Error returned when a timeout expires.
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed;

#[cfg(target_arch = "wasm32")]
impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "deadline has elapsed")
    }
}

#[cfg(target_arch = "wasm32")]
impl std::error::Error for Elapsed {}

/// Requires a future to complete before the specified duration has elapsed.
#[cfg(target_arch = "wasm32")]
pub async fn timeout<F>(duration: Duration, future: F) -> Result<F::Output, Elapsed>
where
    F: std::future::Future,
{
    let sleep_fut = sleep(duration);

    futures::pin_mut!(future);
    futures::pin_mut!(sleep_fut);

    match futures::future::select(future, sleep_fut).await {
        futures::future::Either::Left((output, _)) => Ok(output),
        futures::future::Either::Right(_) => Err(Elapsed),
    }
}

/// Converts a duration to fractional milliseconds, the unit latency metrics
/// are reported in.
pub fn as_millis_f64(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}
