//! Session registry enforcing single playback.

use bridge_traits::media::MediaBackend;
use core_runtime::config::AppConfig;
use core_runtime::events::EventBus;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use crate::error::{PlaybackError, Result};
use crate::loader::LazyLoader;
use crate::metrics::PerformanceMonitor;
use crate::path::PathResolver;
use crate::session::{AudioSession, PlaybackCoordinator, SessionContext, SessionState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStats {
    pub total: usize,
    pub loading: usize,
    pub playing: usize,
    pub paused: usize,
    pub stopped: usize,
    pub error: usize,
}

#[derive(Default)]
struct Registry {
    /// Creation order; keyboard shortcuts pick the first eligible session.
    sessions: Mutex<Vec<Arc<AudioSession>>>,
    /// Sessions paused because the page was hidden.
    hidden_paused: Mutex<Vec<String>>,
}

impl Registry {
    fn snapshot(&self) -> Vec<Arc<AudioSession>> {
        self.sessions.lock().clone()
    }
}

impl PlaybackCoordinator for Registry {
    fn stop_others(&self, except: &str) -> usize {
        let mut stopped = 0;
        for session in self.snapshot() {
            if session.id() == except {
                continue;
            }
            let state = session.state();
            if state.is_active() || state == SessionState::Loading {
                match session.stop() {
                    Ok(()) => stopped += 1,
                    Err(e) => warn!(audio_id = %session.id(), error = %e, "Failed to stop session"),
                }
            }
        }
        stopped
    }
}

pub struct SessionManager {
    backend: Arc<dyn MediaBackend>,
    ctx: SessionContext,
    registry: Arc<Registry>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn MediaBackend>, ctx: SessionContext) -> Self {
        Self {
            backend,
            ctx,
            registry: Arc::new(Registry::default()),
        }
    }

    /// Wire resolver, loader and monitor from configuration.
    pub fn from_config(
        config: &AppConfig,
        monitor: Arc<PerformanceMonitor>,
        events: Option<EventBus>,
    ) -> Self {
        let ctx = SessionContext {
            resolver: Arc::new(PathResolver::from_config(config)),
            loader: Arc::new(LazyLoader::from_config(config)),
            monitor,
            ready_timeout: config.ready_timeout,
            events,
        };
        Self::new(Arc::clone(&config.media_backend), ctx)
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn loader(&self) -> &Arc<LazyLoader> {
        &self.ctx.loader
    }

    pub fn resolver(&self) -> &Arc<PathResolver> {
        &self.ctx.resolver
    }

    pub fn monitor(&self) -> &Arc<PerformanceMonitor> {
        &self.ctx.monitor
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Create a session, replacing (and destroying) any with the same id.
    pub fn create_session(&self, audio_id: &str, audio_file: &str) -> Arc<AudioSession> {
        self.destroy_session(audio_id);

        let session = AudioSession::new(
            audio_id,
            audio_file,
            self.backend.create_element(),
            self.ctx.clone(),
        );
        let registry: Arc<dyn PlaybackCoordinator> = self.registry.clone();
        let coordinator: Weak<dyn PlaybackCoordinator> = Arc::downgrade(&registry);
        session.set_coordinator(coordinator);

        self.registry.sessions.lock().push(Arc::clone(&session));
        session
    }

    pub fn session(&self, audio_id: &str) -> Option<Arc<AudioSession>> {
        self.registry
            .sessions
            .lock()
            .iter()
            .find(|session| session.id() == audio_id)
            .cloned()
    }

    pub fn sessions(&self) -> Vec<Arc<AudioSession>> {
        self.registry.snapshot()
    }

    pub fn len(&self) -> usize {
        self.registry.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn destroy_session(&self, audio_id: &str) -> bool {
        let removed = {
            let mut sessions = self.registry.sessions.lock();
            sessions
                .iter()
                .position(|session| session.id() == audio_id)
                .map(|index| sessions.remove(index))
        };
        match removed {
            Some(session) => {
                session.destroy();
                true
            }
            None => false,
        }
    }

    pub fn destroy_all(&self) -> usize {
        let sessions = std::mem::take(&mut *self.registry.sessions.lock());
        self.registry.hidden_paused.lock().clear();
        for session in &sessions {
            session.destroy();
        }
        if !sessions.is_empty() {
            debug!(count = sessions.len(), "Destroyed all sessions");
        }
        sessions.len()
    }

    // =========================================================================
    // Transport
    // =========================================================================

    pub async fn play(&self, audio_id: &str) -> Result<()> {
        self.require(audio_id)?.play().await
    }

    pub async fn retry(&self, audio_id: &str) -> Result<()> {
        self.require(audio_id)?.retry().await
    }

    fn require(&self, audio_id: &str) -> Result<Arc<AudioSession>> {
        self.session(audio_id)
            .ok_or_else(|| PlaybackError::SessionNotFound(audio_id.to_string()))
    }

    pub fn stop_others(&self, except: &str) -> usize {
        self.registry.stop_others(except)
    }

    /// Stop every loading, playing or paused session.
    pub fn stop_all(&self) -> usize {
        let stopped = self.registry.stop_others("");
        if stopped > 0 {
            info!(stopped, "Stopped all playback");
        }
        stopped
    }

    /// The session currently in `Playing`.
    pub fn playing(&self) -> Option<Arc<AudioSession>> {
        self.registry
            .snapshot()
            .into_iter()
            .find(|session| session.state() == SessionState::Playing)
    }

    /// First session that can be started without a retry.
    pub fn first_available(&self) -> Option<Arc<AudioSession>> {
        self.registry
            .snapshot()
            .into_iter()
            .find(|session| session.state() != SessionState::Error)
    }

    pub fn stats(&self) -> ManagerStats {
        let mut stats = ManagerStats::default();
        for session in self.registry.snapshot() {
            stats.total += 1;
            match session.state() {
                SessionState::Loading => stats.loading += 1,
                SessionState::Playing => stats.playing += 1,
                SessionState::Paused => stats.paused += 1,
                SessionState::Stopped => stats.stopped += 1,
                SessionState::Error => stats.error += 1,
            }
        }
        stats
    }

    // =========================================================================
    // Page visibility
    // =========================================================================

    /// Pause whatever is playing and remember it. Returns how many paused.
    pub fn page_hidden(&self) -> usize {
        let mut paused = Vec::new();
        for session in self.registry.snapshot() {
            if session.state() == SessionState::Playing && session.pause().is_ok() {
                paused.push(session.id().to_string());
            }
        }
        let count = paused.len();
        self.registry.hidden_paused.lock().extend(paused);
        if count > 0 {
            debug!(count, "Paused playback for hidden page");
        }
        count
    }

    /// Resume sessions paused by [`page_hidden`](Self::page_hidden).
    pub async fn page_visible(&self) -> usize {
        let remembered = std::mem::take(&mut *self.registry.hidden_paused.lock());
        let mut resumed = 0;
        for audio_id in remembered {
            let Some(session) = self.session(&audio_id) else {
                continue;
            };
            if session.state() != SessionState::Paused {
                continue;
            }
            match session.play().await {
                Ok(()) => resumed += 1,
                Err(e) => warn!(%audio_id, error = %e, "Failed to resume after page became visible"),
            }
        }
        resumed
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("sessions", &self.len())
            .field("ready_timeout", &self.ctx.ready_timeout)
            .finish()
    }
}
