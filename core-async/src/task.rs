//! Task spawning abstractions.
//!
//! - On native platforms: Uses `tokio::task::spawn`
//! - On WASM: Uses `wasm_bindgen_futures::spawn_local`
//!
//! `spawn` returns an awaitable `JoinHandle` and is native-only. Fire-and-forget
//! work that must run on both targets goes through [`spawn_detached`].

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::{yield_now, JoinError, JoinHandle};

/// Spawns a new asynchronous task using the Tokio runtime.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

/// Spawns a task whose result nobody waits for.
///
/// On native targets this requires an ambient Tokio runtime; when none is
/// running the future is dropped and `false` is returned.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_detached<F>(future: F) -> bool
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(future);
            true
        }
        Err(_) => false,
    }
}

/// Spawns a task on the browser's microtask queue.
#[cfg(target_arch = "wasm32")]
pub fn spawn_detached<F>(future: F) -> bool
where
    F: std::future::Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
    true
}

/// Yields execution back to the browser event loop.
#[cfg(target_arch = "wasm32")]
pub async fn yield_now() {
    gloo_timers::future::TimeoutFuture::new(0).await;
}
