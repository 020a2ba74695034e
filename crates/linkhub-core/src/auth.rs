//! Identity for the signed-in user
//!
//! The collection never reads ambient session state. It is told who the
//! current owner is through an `AuthProvider`, which publishes identity
//! changes on a `watch` channel.
//!
//! `SessionAuth` keeps the session in `session.toml` inside the data
//! directory, so a sign-in survives across process runs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

use crate::config::Config;
use crate::models::OwnerId;

/// Source of the current user's identity
pub trait AuthProvider {
    /// The signed-in owner, if any
    fn current_owner(&self) -> Option<OwnerId>;

    /// Subscribe to identity changes
    ///
    /// The receiver observes the current identity immediately and every
    /// sign-in and sign-out afterwards.
    fn subscribe(&self) -> watch::Receiver<Option<OwnerId>>;
}

/// A signed-in session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    /// The user id links are owned by
    pub owner_id: OwnerId,
    /// Email used to sign in, for display
    #[serde(default)]
    pub email: Option<String>,
    /// Bearer token for hosted backends
    #[serde(default)]
    pub access_token: Option<String>,
}

impl Session {
    /// Create a session for an owner
    pub fn new(owner_id: impl Into<OwnerId>) -> Self {
        Self {
            owner_id: owner_id.into(),
            email: None,
            access_token: None,
        }
    }

    /// A short greeting name: the email's local part, or the owner id
    pub fn display_name(&self) -> &str {
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| self.owner_id.as_str())
    }
}

/// File-backed auth provider
pub struct SessionAuth {
    path: PathBuf,
    session: Option<Session>,
    identity: watch::Sender<Option<OwnerId>>,
}

impl SessionAuth {
    /// Load the session stored in the configured data directory
    pub fn open(config: &Config) -> Result<Self> {
        Self::open_at(config.session_path())
    }

    /// Load the session stored at `path`, if one exists
    pub fn open_at(path: PathBuf) -> Result<Self> {
        let session = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read session file: {:?}", path))?;
            let session: Session = toml::from_str(&content)
                .with_context(|| format!("Failed to parse session file: {:?}", path))?;
            Some(session)
        } else {
            None
        };

        let owner = session.as_ref().map(|s| s.owner_id.clone());
        let (identity, _) = watch::channel(owner);

        Ok(Self {
            path,
            session,
            identity,
        })
    }

    /// The current session, if signed in
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Persist a new session and announce the new owner
    pub fn sign_in(&mut self, session: Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content = toml::to_string_pretty(&session).context("Failed to serialize session")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write session file: {:?}", self.path))?;

        info!("Signed in as {}", session.owner_id);
        self.identity.send_replace(Some(session.owner_id.clone()));
        self.session = Some(session);
        Ok(())
    }

    /// Forget the session and announce the sign-out
    pub fn sign_out(&mut self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove session file: {:?}", self.path))?;
        }

        if let Some(session) = self.session.take() {
            info!("Signed out {}", session.owner_id);
        }
        self.identity.send_replace(None);
        Ok(())
    }
}

impl AuthProvider for SessionAuth {
    fn current_owner(&self) -> Option<OwnerId> {
        self.session.as_ref().map(|s| s.owner_id.clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<OwnerId>> {
        self.identity.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn session_path(dir: &TempDir) -> PathBuf {
        dir.path().join("session.toml")
    }

    #[test]
    fn test_starts_signed_out() {
        let dir = TempDir::new().unwrap();
        let auth = SessionAuth::open_at(session_path(&dir)).unwrap();

        assert!(auth.current_owner().is_none());
        assert!(auth.subscribe().borrow().is_none());
    }

    #[test]
    fn test_sign_in_persists_and_publishes() {
        let dir = TempDir::new().unwrap();
        let mut auth = SessionAuth::open_at(session_path(&dir)).unwrap();
        let mut rx = auth.subscribe();

        let mut session = Session::new("user-1");
        session.email = Some("ada@example.com".to_string());
        auth.sign_in(session.clone()).unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), Some(OwnerId::new("user-1")));

        let reopened = SessionAuth::open_at(session_path(&dir)).unwrap();
        assert_eq!(reopened.session(), Some(&session));
        assert_eq!(reopened.current_owner(), Some(OwnerId::new("user-1")));
    }

    #[test]
    fn test_sign_out_removes_session() {
        let dir = TempDir::new().unwrap();
        let mut auth = SessionAuth::open_at(session_path(&dir)).unwrap();
        auth.sign_in(Session::new("user-1")).unwrap();
        let rx = auth.subscribe();

        auth.sign_out().unwrap();

        assert!(auth.current_owner().is_none());
        assert!(rx.borrow().is_none());
        assert!(!session_path(&dir).exists());

        // Signing out twice is harmless
        auth.sign_out().unwrap();
    }

    #[test]
    fn test_display_name() {
        let mut session = Session::new("user-1");
        assert_eq!(session.display_name(), "user-1");

        session.email = Some("ada@example.com".to_string());
        assert_eq!(session.display_name(), "ada");
    }

    #[test]
    fn test_corrupt_session_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(session_path(&dir), "owner_id = [").unwrap();

        assert!(SessionAuth::open_at(session_path(&dir)).is_err());
    }
}
