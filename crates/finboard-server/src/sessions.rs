//! Per-client dashboard sessions
//!
//! Each session owns its own response cache, ledger and budget overrides.
//! Requests for one session run one at a time behind its mutex.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use finboard_core::DashboardSession;

/// Request header naming the session
pub const SESSION_HEADER: &str = "x-session-id";

/// Used when the header is absent; shared by every such client
pub const DEFAULT_SESSION_ID: &str = "default";

/// Session timeout (30 minutes of inactivity)
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

const MAX_SESSION_ID_LEN: usize = 64;

pub type SharedSession = Arc<Mutex<DashboardSession>>;

struct SessionEntry {
    last_activity: Instant,
    session: SharedSession,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            last_activity: Instant::now(),
            session: Arc::new(Mutex::new(DashboardSession::new())),
        }
    }

    fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.elapsed() > timeout
    }
}

pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_timeout(SESSION_TIMEOUT)
    }
}

impl SessionStore {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    /// Start a fresh session and return its id
    pub async fn create(&self) -> String {
        let id = new_session_id();
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions);
        sessions.insert(id.clone(), SessionEntry::new());
        debug!(session = %id, active = sessions.len(), "Session created");
        id
    }

    /// The session for `id`, created on first use or after expiry
    pub async fn get_or_create(&self, id: &str) -> SharedSession {
        let mut sessions = self.sessions.write().await;
        self.evict_expired(&mut sessions);
        let entry = sessions.entry(id.to_string()).or_insert_with(|| {
            debug!(session = %id, "Session started");
            SessionEntry::new()
        });
        entry.last_activity = Instant::now();
        entry.session.clone()
    }

    /// Drop a session; returns whether it existed
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn evict_expired(&self, sessions: &mut HashMap<String, SessionEntry>) {
        let timeout = self.timeout;
        sessions.retain(|id, entry| {
            let keep = !entry.is_expired(timeout);
            if !keep {
                debug!(session = %id, "Session expired");
            }
            keep
        });
    }
}

/// Session id from the request headers
///
/// Missing or blank headers select the default session, which every
/// headerless client shares along with its ledger. Returns `None` for
/// ids that are too long or contain anything but ASCII alphanumerics, `-`
/// and `_`.
pub fn session_id(headers: &HeaderMap) -> Option<String> {
    let Some(value) = headers.get(SESSION_HEADER) else {
        return Some(DEFAULT_SESSION_ID.to_string());
    };
    let id = value.to_str().ok()?.trim();
    if id.is_empty() {
        return Some(DEFAULT_SESSION_ID.to_string());
    }
    let valid = id.len() <= MAX_SESSION_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| id.to_string())
}

fn new_session_id() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let mut hasher = Sha256::new();
    hasher.update(nanos.to_le_bytes());
    hasher.update(std::process::id().to_le_bytes());
    let hash = format!("{:x}", hasher.finalize());
    format!("fb_{}", &hash[..24])
}
