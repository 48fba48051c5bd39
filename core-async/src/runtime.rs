//! Runtime utilities that abstract over the underlying async executor.
//!
//! On native targets we wrap Tokio's runtime primitives so that downstream
//! crates never need to depend on Tokio directly. On WebAssembly the browser
//! drives futures, so `block_on` is only meant for futures that never wait on
//! timers or I/O.

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::runtime::{Builder, Handle, Runtime};

/// Runs the provided future to completion on a fresh current-thread runtime.
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("core_async::runtime::block_on: failed to build Tokio runtime")
        .block_on(future)
}

/// Runs the provided future on a current-thread runtime whose clock starts
/// paused.
///
/// Timers auto-advance whenever the runtime is idle, so tests that wait on
/// multi-second timeouts finish instantly and deterministically.
#[cfg(not(target_arch = "wasm32"))]
pub fn block_on_paused<F>(future: F) -> F::Output
where
    F: std::future::Future,
{
    Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .expect("core_async::runtime::block_on_paused: failed to build Tokio runtime")
        .block_on(future)
}

#[cfg(target_arch = "wasm32")]
pub use futures::executor::block_on;

#[cfg(target_arch = "wasm32")]
pub use wasm_bindgen_futures::spawn_local;
