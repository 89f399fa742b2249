/*!
 * Session coordinator.
 *
 * Owns the browser session used for fetching translations. Fetches are
 * serialized through one gate: a caller arriving while another fetch is in
 * flight waits for it to finish. Each fetch starts a fresh session and
 * closes it before returning, on success and on every failure path.
 */

use async_trait::async_trait;
use log::{debug, error, info, warn};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::browser::{BrowserSession, SessionLauncher};
use crate::errors::FetchError;
use crate::translation::extractor::Extractor;
use crate::translation::{truncate_text, FetchRequest, FetchResult};

/// Lifecycle of the coordinator's session slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been started yet
    Idle,
    /// A session is live and being driven
    Active,
    /// The last session has been released
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Something that can fetch a translation for a request
#[async_trait]
pub trait TranslationFetcher: Send + Sync {
    async fn fetch_translation(&self, request: FetchRequest) -> FetchResult;
}

/// A live session, released when the guard is closed or dropped
struct ActiveSession<'a> {
    session: Option<Box<dyn BrowserSession>>,
    state: &'a RwLock<SessionState>,
    label: String,
}

impl<'a> ActiveSession<'a> {
    fn new(session: Box<dyn BrowserSession>, state: &'a RwLock<SessionState>, label: String) -> Self {
        *state.write() = SessionState::Active;
        Self {
            session: Some(session),
            state,
            label,
        }
    }

    fn handle(&mut self) -> Result<&mut Box<dyn BrowserSession>, FetchError> {
        self.session
            .as_mut()
            .ok_or_else(|| FetchError::Session("Session already released".to_string()))
    }

    async fn close(mut self) -> Result<(), FetchError> {
        let result = match self.session.take() {
            Some(mut session) => session.close().await,
            None => Ok(()),
        };
        *self.state.write() = SessionState::Closed;
        debug!("Session {} closed", self.label);
        result
    }
}

impl Drop for ActiveSession<'_> {
    fn drop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        *self.state.write() = SessionState::Closed;
        warn!("Session {} released without close, closing in background", self.label);

        let label = std::mem::take(&mut self.label);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = session.close().await {
                        error!("Failed to close abandoned session {}: {}", label, e);
                    }
                });
            }
            Err(_) => error!("No runtime to close abandoned session {}", label),
        }
    }
}

/// Serializes fetches through one browser session at a time
pub struct SessionCoordinator {
    /// Starts sessions on demand
    launcher: Arc<dyn SessionLauncher>,
    /// Page interaction
    extractor: Extractor,
    /// Held for the whole of each fetch
    gate: Mutex<()>,
    /// Written only while holding `gate`
    state: RwLock<SessionState>,
    /// Sessions started so far
    sessions_started: AtomicU64,
}

impl SessionCoordinator {
    /// Create a coordinator; no session is started until the first fetch
    pub fn new(launcher: Arc<dyn SessionLauncher>, extractor: Extractor) -> Self {
        Self {
            launcher,
            extractor,
            gate: Mutex::new(()),
            state: RwLock::new(SessionState::Idle),
            sessions_started: AtomicU64::new(0),
        }
    }

    /// Current state of the session slot
    pub fn state(&self) -> SessionState {
        *self.state.read()
    }

    /// Number of sessions started since creation
    pub fn sessions_started(&self) -> u64 {
        self.sessions_started.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl TranslationFetcher for SessionCoordinator {
    async fn fetch_translation(&self, request: FetchRequest) -> FetchResult {
        let _gate = self.gate.lock().await;

        let fetch_id = Uuid::new_v4().to_string();
        let label = fetch_id[..8].to_string();
        info!(
            "Fetching translation {} for '{}'{}",
            label,
            truncate_text(&request.text, 30),
            request
                .context_title
                .as_deref()
                .map(|t| format!(" ({})", t))
                .unwrap_or_default()
        );

        let session = match self.launcher.launch().await {
            Ok(session) => session,
            Err(e) => {
                *self.state.write() = SessionState::Closed;
                error!("Failed to start browser session {}: {}", label, e);
                return Err(e);
            }
        };
        self.sessions_started.fetch_add(1, Ordering::Relaxed);

        let mut active = ActiveSession::new(session, &self.state, label.clone());
        let outcome = match active.handle() {
            Ok(session) => self.extractor.extract(session.as_mut(), &request).await,
            Err(e) => Err(e),
        };

        if let Err(e) = active.close().await {
            error!("Failed to close browser session {}: {}", label, e);
        }

        match &outcome {
            Ok(_) => info!("Fetch {} succeeded", label),
            Err(e) => warn!("Fetch {} failed: {}", label, e),
        }
        outcome
    }
}
