//! Session state machine
//!
//! Two states, `LoggedOut` and `LoggedIn(role)`, cycled by login/logout.
//! Only a boolean "logged in" flag survives a process restart; the role
//! is re-derived by re-fetching the profile on
//! [`SessionManager::restore_session`]. Routing guards consume the state
//! through a watch channel instead of ambient globals.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

use shared::models::Role;
use shared::response::LoginEnvelope;

use crate::{ApiError, ApiGateway, AppState, AuthError, NotificationBus};

// ============================================================================
// Persisted flag
// ============================================================================

/// Durable storage for the single persisted boolean: "was logged in".
pub trait FlagStore: Send + Sync {
    fn read(&self) -> io::Result<bool>;
    fn set(&self) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Flag file on disk, `{dir}/session_flag.json`.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    path: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct FlagFile {
    logged_in: bool,
}

impl FileFlagStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join("session_flag.json"),
        }
    }
}

impl FlagStore for FileFlagStore {
    fn read(&self) -> io::Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let flag: FlagFile = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(flag.logged_in)
    }

    fn set(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&FlagFile { logged_in: true })
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        std::fs::write(&self.path, content)?;
        tracing::debug!(path = %self.path.display(), "session flag persisted");
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            tracing::debug!(path = %self.path.display(), "session flag cleared");
        }
        Ok(())
    }
}

/// In-memory flag store for tests and embedded use.
#[derive(Debug, Default)]
pub struct MemoryFlagStore {
    flag: AtomicBool,
}

impl MemoryFlagStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FlagStore for MemoryFlagStore {
    fn read(&self) -> io::Result<bool> {
        Ok(self.flag.load(Ordering::SeqCst))
    }

    fn set(&self) -> io::Result<()> {
        self.flag.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        self.flag.store(false, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Session manager
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    LoggedOut,
    LoggedIn {
        role: Role,
    },
}

impl SessionState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, SessionState::LoggedIn { .. })
    }

    pub fn role(self) -> Option<Role> {
        match self {
            SessionState::LoggedIn { role } => Some(role),
            SessionState::LoggedOut => None,
        }
    }
}

pub struct SessionManager {
    gateway: Arc<dyn ApiGateway>,
    bus: NotificationBus,
    flags: Arc<dyn FlagStore>,
    app_state: AppState,
    state: watch::Sender<SessionState>,
}

impl SessionManager {
    pub fn new(
        gateway: Arc<dyn ApiGateway>,
        bus: NotificationBus,
        flags: Arc<dyn FlagStore>,
        app_state: AppState,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::LoggedOut);
        Self {
            gateway,
            bus,
            flags,
            app_state,
            state,
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch session transitions (for routing guards).
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Authenticate against the backend.
    ///
    /// A returned role outside the staff set does not transition the
    /// session: the HTTP exchange succeeded, but the account is not
    /// authorized for this console.
    pub async fn login(&self, email: &str, password: &str) -> Result<Role, AuthError> {
        let body = json!({ "email": email, "password": password });
        let value = match self.gateway.post("/auth/login", body).await {
            Ok(value) => value,
            Err(err) => {
                self.bus.error("Login failed. Please try again.");
                return Err(err.into());
            }
        };

        let envelope: LoginEnvelope = serde_json::from_value(value).map_err(|e| {
            self.bus.error("Login failed. Please try again.");
            AuthError::Api(ApiError::from(e))
        })?;

        let role = envelope.user.role;
        if !role.is_console_staff() {
            tracing::info!(%role, "login rejected: not console staff");
            self.bus
                .error("You are not authorized to access this console.");
            return Err(AuthError::NotAuthorized {
                role: role.to_string(),
            });
        }

        if let Err(err) = self.flags.set() {
            // The in-memory session is still valid; only restore-on-reload
            // is degraded.
            tracing::warn!(error = %err, "could not persist session flag");
        }
        self.state.send_replace(SessionState::LoggedIn { role });
        tracing::info!(%role, "logged in");
        self.bus.success("Login successful");
        Ok(role)
    }

    /// End the session. The local transition has priority: flag, state
    /// and shared app state are cleared even when the network call fails.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let result = self.gateway.put("/auth/logout", None).await;

        if let Err(err) = self.flags.clear() {
            tracing::warn!(error = %err, "could not clear session flag");
        }
        self.state.send_replace(SessionState::LoggedOut);
        self.app_state.clear();
        tracing::info!("logged out");

        match result {
            Ok(_) => {
                self.bus.success("Logout successful");
                Ok(())
            }
            Err(err) => {
                self.bus.error("Logout failed on the server; session cleared locally");
                Err(err.into())
            }
        }
    }

    /// Invoked once at process start. A persisted flag makes the session
    /// tentatively logged in, pending a profile re-fetch:
    ///
    /// - profile fetch succeeds with a staff role: `LoggedIn(role)`
    /// - backend answers 401 (or a non-staff role): flag cleared, `LoggedOut`
    /// - any other failure: flag kept for a later retry, state `LoggedOut`
    pub async fn restore_session(&self) -> Result<SessionState, AuthError> {
        if !self.flags.read()? {
            return Ok(SessionState::LoggedOut);
        }

        match self.gateway.get("/auth/profile").await {
            Ok(value) => {
                let profile: shared::models::Profile =
                    serde_json::from_value(value).map_err(ApiError::from)?;
                if profile.role.is_console_staff() {
                    let state = SessionState::LoggedIn { role: profile.role };
                    self.state.send_replace(state);
                    tracing::info!(role = %profile.role, "session restored");
                    Ok(state)
                } else {
                    self.flags.clear()?;
                    self.state.send_replace(SessionState::LoggedOut);
                    tracing::info!(role = %profile.role, "stale session for non-staff role");
                    Ok(SessionState::LoggedOut)
                }
            }
            Err(ApiError::Unauthorized) => {
                self.flags.clear()?;
                self.state.send_replace(SessionState::LoggedOut);
                tracing::info!("persisted session no longer valid");
                Ok(SessionState::LoggedOut)
            }
            Err(err) => {
                tracing::warn!(error = %err, "session restore deferred");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_flag_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileFlagStore::new(dir.path());

        assert!(!store.read().unwrap(), "absent file reads as logged out");
        store.set().unwrap();
        assert!(store.read().unwrap());
        store.clear().unwrap();
        assert!(!store.read().unwrap());
        // Clearing twice is fine.
        store.clear().unwrap();
    }

    #[test]
    fn file_flag_survives_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        FileFlagStore::new(dir.path()).set().unwrap();

        let fresh = FileFlagStore::new(dir.path());
        assert!(fresh.read().unwrap());
    }
}
