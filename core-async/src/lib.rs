//! Runtime-agnostic async abstraction layer for the lesson player core.
//!
//! This crate provides a unified async API that works across different runtime environments:
//! - Native platforms (desktop, tests): Uses Tokio runtime
//! - WebAssembly: Uses the browser's event loop with wasm-bindgen-futures
//!
//! # Architecture
//!
//! The crate uses conditional compilation (`#[cfg]`) to provide platform-specific
//! implementations while keeping one API surface. All core-* and bridge-*
//! crates depend on this crate instead of depending on tokio directly.
//!
//! # Modules
//!
//! - `task`: Task spawning (`spawn`, `spawn_detached`)
//! - `time`: Sleep, timeout and a monotonic `Instant`
//! - `sync`: Synchronization primitives (Mutex, channels, Notify)
//! - `runtime`: `block_on` helpers used by the test/main macros
//!
//! # Examples
//!
//! ```rust
//! use core_async::time::{sleep, timeout, Duration};
//!
//! async fn example() {
//!     let outcome = timeout(Duration::from_secs(5), async {
//!         sleep(Duration::from_millis(10)).await;
//!         42
//!     })
//!     .await;
//!     assert_eq!(outcome.ok(), Some(42));
//! }
//! ```

// Re-export the async entry-point/test macros so downstream crates never need
// direct Tokio dependencies.
pub use core_async_macros::{main, test};

#[cfg(target_arch = "wasm32")]
pub mod test_support {
    pub use wasm_bindgen_test::wasm_bindgen_test;
}

pub mod runtime;
pub mod sync;
pub mod task;
pub mod time;

pub use task::spawn_detached;
pub use time::{sleep, timeout, Duration, Instant};
