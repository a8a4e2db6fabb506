//! Per-visitor session state.
//!
//! The only thing remembered about a visitor is whether they accepted the
//! terms of use. Sessions live in memory, are identified by a cookie and
//! expire after a period without activity.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::{header, HeaderMap};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "psicodoc_session";
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub terms_accepted: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    session: Session,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Unknown or expired ids get a fresh session. A live session's idle
    /// clock restarts.
    pub async fn get(&self, id: Uuid) -> Session {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        if let Some(entry) = sessions.get_mut(&id) {
            if now.duration_since(entry.last_seen) < self.ttl {
                entry.last_seen = now;
                return entry.session.clone();
            }
            sessions.remove(&id);
        }
        Session::default()
    }

    pub async fn accept_terms(&self, id: Uuid) {
        let mut sessions = self.sessions.write().await;
        let now = Instant::now();
        let ttl = self.ttl;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < ttl);
        let entry = sessions.entry(id).or_insert_with(|| Entry {
            session: Session::default(),
            last_seen: now,
        });
        entry.session.terms_accepted = true;
        entry.last_seen = now;
    }

    pub async fn terms_accepted(&self, id: Uuid) -> bool {
        self.get(id).await.terms_accepted
    }

    /// Drop every session idle for longer than the TTL. Returns how many
    /// were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let now = Instant::now();
        let ttl = self.ttl;
        sessions.retain(|_, entry| now.duration_since(entry.last_seen) < ttl);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Purge expired sessions every `every` until `cancel` fires.
    pub fn spawn_sweeper(&self, every: Duration, cancel: CancellationToken) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        let removed = store.purge_expired().await;
                        if removed > 0 {
                            debug!(removed, "Expired sessions purged");
                        }
                    }
                }
            }
        })
    }
}

/// Session id carried by the request's cookies, if any.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}
