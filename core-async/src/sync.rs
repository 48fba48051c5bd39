//! Synchronization primitives.
//!
//! Tokio's `sync` module has no runtime dependency, so both native and
//! WebAssembly builds re-export the same types. On wasm32 the crate is pulled
//! in with only the `sync` feature enabled.
//!
//! # Examples
//!
//! ```rust
//! use core_async::sync::{oneshot, Mutex};
//!
//! async fn example() {
//!     let mutex = Mutex::new(42);
//!     *mutex.lock().await += 1;
//!
//!     let (tx, rx) = oneshot::channel();
//!     tx.send(7).ok();
//!     assert_eq!(rx.await.ok(), Some(7));
//! }
//! ```

pub use tokio::sync::{
    broadcast, mpsc, oneshot, watch, Mutex, MutexGuard, Notify, RwLock, Semaphore,
};
