//! # Lazy Loader
//!
//! Bounded audio prefetcher.
//!
//! At most `max_concurrent` prefetches run at once. Further requests wait in
//! a FIFO queue and receive a slot directly from the load that frees it.
//! Successful loads are remembered by resolved URL and never fetched again.
//! A prefetch that outlives `load_timeout` fails and releases its slot.

use bridge_traits::media::MediaBackend;
use core_async::sync::oneshot;
use core_async::time::timeout;
use core_runtime::config::AppConfig;
use futures::future::join_all;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{PlaybackError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoaderStats {
    pub active: usize,
    pub queued: usize,
    pub loaded: usize,
}

/// Outcome of a best-effort batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PreloadReport {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl PreloadReport {
    pub fn merge(self, other: PreloadReport) -> PreloadReport {
        PreloadReport {
            requested: self.requested + other.requested,
            succeeded: self.succeeded + other.succeeded,
            failed: self.failed + other.failed,
        }
    }
}

#[derive(Default)]
struct LoaderState {
    active: usize,
    queue: VecDeque<oneshot::Sender<()>>,
    loaded: HashSet<String>,
}

pub struct LazyLoader {
    backend: Arc<dyn MediaBackend>,
    max_concurrent: usize,
    load_timeout: Duration,
    state: Mutex<LoaderState>,
}

/// Held while a prefetch occupies a slot. Dropping it hands the slot to
/// the next waiter or frees it.
struct SlotGuard<'a> {
    loader: &'a LazyLoader,
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.loader.release_slot();
    }
}

/// A queued request. A slot handed over after the request was abandoned is
/// passed on when this is dropped.
struct PendingSlot<'a> {
    loader: &'a LazyLoader,
    rx: oneshot::Receiver<()>,
    granted: bool,
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        if self.granted {
            return;
        }
        self.rx.close();
        if self.rx.try_recv().is_ok() {
            self.loader.release_slot();
        }
    }
}

impl LazyLoader {
    pub fn new(backend: Arc<dyn MediaBackend>, max_concurrent: usize, load_timeout: Duration) -> Self {
        Self {
            backend,
            max_concurrent: max_concurrent.max(1),
            load_timeout,
            state: Mutex::new(LoaderState::default()),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            Arc::clone(&config.media_backend),
            config.max_concurrent_loads,
            config.load_timeout,
        )
    }

    async fn acquire_slot(&self) -> Result<SlotGuard<'_>> {
        let waiter = {
            let mut state = self.state.lock();
            if state.active < self.max_concurrent {
                state.active += 1;
                None
            } else {
                let (tx, rx) = oneshot::channel();
                state.queue.push_back(tx);
                Some(rx)
            }
        };

        if let Some(rx) = waiter {
            let mut pending = PendingSlot {
                loader: self,
                rx,
                granted: false,
            };
            // The sender is dropped when the queue is cleared.
            (&mut pending.rx)
                .await
                .map_err(|_| PlaybackError::Cancelled)?;
            pending.granted = true;
        }
        Ok(SlotGuard { loader: self })
    }

    fn release_slot(&self) {
        let mut state = self.state.lock();
        while let Some(next) = state.queue.pop_front() {
            if next.send(()).is_ok() {
                return;
            }
        }
        state.active = state.active.saturating_sub(1);
    }

    /// Prefetch `url` unless it was loaded before.
    pub async fn load(&self, url: &str) -> Result<()> {
        if self.is_loaded(url) {
            return Ok(());
        }

        let _slot = self.acquire_slot().await?;
        if self.is_loaded(url) {
            return Ok(());
        }

        debug!(url, "Prefetching audio");
        match timeout(self.load_timeout, self.backend.prefetch(url)).await {
            Ok(Ok(())) => {
                self.state.lock().loaded.insert(url.to_string());
                debug!(url, "Audio prefetched");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(url, error = %e, "Audio prefetch failed");
                Err(PlaybackError::load_failed(url, &e))
            }
            Err(_) => {
                warn!(url, timeout_ms = self.load_timeout.as_millis() as u64, "Audio prefetch timed out");
                Err(PlaybackError::LoadTimeout {
                    path: url.to_string(),
                    after: self.load_timeout,
                })
            }
        }
    }

    /// Best-effort load; failures are logged and reported as `false`.
    pub async fn preload(&self, url: &str) -> bool {
        match self.load(url).await {
            Ok(()) => true,
            Err(e) => {
                debug!(url, error = %e, "Preload skipped");
                false
            }
        }
    }

    pub async fn batch_preload(&self, urls: &[String]) -> PreloadReport {
        let results = join_all(urls.iter().map(|url| self.preload(url))).await;
        let succeeded = results.iter().filter(|ok| **ok).count();

        info!(succeeded, requested = urls.len(), "Batch preload finished");
        PreloadReport {
            requested: urls.len(),
            succeeded,
            failed: urls.len() - succeeded,
        }
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.state.lock().loaded.contains(url)
    }

    /// Forget loaded URLs and cancel queued requests. Running prefetches
    /// finish normally.
    pub fn clear_cache(&self) {
        let mut state = self.state.lock();
        state.loaded.clear();
        state.queue.clear();
        info!("Audio load cache cleared");
    }

    pub fn stats(&self) -> LoaderStats {
        let state = self.state.lock();
        LoaderStats {
            active: state.active,
            queued: state.queue.len(),
            loaded: state.loaded.len(),
        }
    }
}
