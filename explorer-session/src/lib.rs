//! Owns a keyed collection of sessions, each with its own Registry and
//! Invoker, and expires idle sessions on a background cleanup loop. See
//! `spec.md` §4.4.

mod config;
mod state;

pub use config::SessionManagerConfig;
pub use state::SessionState;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use state::{new_session_id, now_millis};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub active_sessions: usize,
    /// Age in milliseconds of the oldest session by `created_at`, if any.
    pub oldest_session_age_ms: Option<i64>,
    /// Age in milliseconds of the newest session by `created_at`, if any.
    pub newest_session_age_ms: Option<i64>,
}

struct Inner {
    sessions: RwLock<HashMap<String, Arc<SessionState>>>,
}

/// Owns every live [`SessionState`] plus the background cleanup task that
/// expires them. Cheaply cloneable: cloning shares the same map and
/// cancellation token, so a façade can hand out a `SessionManager` per
/// request handler without wrapping it in its own `Arc`.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
    config: SessionManagerConfig,
    cancel: CancellationToken,
    cleanup: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl SessionManager {
    pub fn new(config: SessionManagerConfig) -> Self {
        let manager = Self {
            inner: Arc::new(Inner { sessions: RwLock::new(HashMap::new()) }),
            config,
            cancel: CancellationToken::new(),
            cleanup: Arc::new(std::sync::Mutex::new(None)),
        };
        manager.spawn_cleanup_loop();
        manager
    }

    fn spawn_cleanup_loop(&self) {
        let inner = self.inner.clone();
        let cancel = self.cancel.clone();
        let ttl_ms = self.config.ttl.as_millis() as i64;
        let interval = self.config.cleanup_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        sweep_expired(&inner, ttl_ms).await;
                    }
                }
            }
        });

        *self.cleanup.lock().unwrap() = Some(handle);
    }

    /// Looks up `id`; mints and inserts a fresh session if it's empty or
    /// unknown. Returns the effective (possibly new) session and whether a
    /// caller should echo back a different identifier than the one passed
    /// in (`spec.md` §3, "Lifetime invariant").
    pub async fn get_or_create(&self, id: Option<&str>) -> Arc<SessionState> {
        if let Some(id) = id {
            if !id.is_empty() {
                if let Some(existing) = self.get(id).await {
                    return existing;
                }
            }
        }

        let mut sessions = self.inner.sessions.write().await;
        let new_id = new_session_id();
        let state = Arc::new(SessionState::new(new_id.clone()));
        sessions.insert(new_id, state.clone());
        state
    }

    /// Read lookup that still bumps `last_used` via the atomic timestamp on
    /// hit, without promoting to the map's write lock.
    pub async fn get(&self, id: &str) -> Option<Arc<SessionState>> {
        let sessions = self.inner.sessions.read().await;
        let state = sessions.get(id)?.clone();
        state.touch();
        Some(state)
    }

    pub async fn delete(&self, id: &str) {
        let mut sessions = self.inner.sessions.write().await;
        if let Some(state) = sessions.remove(id) {
            state.invoker.close();
        }
    }

    pub async fn get_stats(&self) -> Stats {
        let sessions = self.inner.sessions.read().await;
        let now = now_millis();
        let oldest = sessions.values().map(|s| s.created_at).min();
        let newest = sessions.values().map(|s| s.created_at).max();
        Stats {
            active_sessions: sessions.len(),
            oldest_session_age_ms: oldest.map(|t| now - t),
            newest_session_age_ms: newest.map(|t| now - t),
        }
    }

    /// Stops the cleanup loop, closes every session's invoker, and empties
    /// the map. Awaits the cleanup task to completion before returning, so
    /// no background work outlives the call (`spec.md` §9, "drain").
    pub async fn close(&self) {
        self.cancel.cancel();
        let handle = self.cleanup.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        let mut sessions = self.inner.sessions.write().await;
        for state in sessions.values() {
            state.invoker.close();
        }
        sessions.clear();
    }
}

async fn sweep_expired(inner: &Inner, ttl_ms: i64) {
    let now = now_millis();
    let expired: Vec<String> = {
        let sessions = inner.sessions.read().await;
        sessions
            .iter()
            .filter(|(_, s)| now - s.last_used() > ttl_ms)
            .map(|(id, _)| id.clone())
            .collect()
    };

    if expired.is_empty() {
        return;
    }

    let mut sessions = inner.sessions.write().await;
    for id in expired {
        if let Some(state) = sessions.remove(&id) {
            tracing::debug!(session_id = %id, "expiring idle session");
            state.invoker.close();
        }
    }
}

/// Only used by tests that need the TTL to elapse without sleeping for the
/// real default.
pub fn config_with(ttl: Duration, cleanup_interval: Duration) -> SessionManagerConfig {
    SessionManagerConfig { ttl, cleanup_interval }
}
