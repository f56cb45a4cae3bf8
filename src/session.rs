//! Explicit session object with a pluggable persistence backend.
//!
//! The session is the plain key-value set issued at login: token plus
//! profile fields. It is persisted as a JSON file for the CLI and held in
//! memory for tests, with no encryption and no expiry metadata.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ClientError;
use crate::models::Role;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub phone_number: String,
}

/// Persistence seam. In-memory for tests, a JSON file in production.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, ClientError>;
    fn save(&self, session: &Session) -> Result<(), ClientError>;
    fn clear(&self) -> Result<(), ClientError>;
}

#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Session>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn load(&self) -> Result<Option<Session>, ClientError> {
        Ok(self.slot.lock().expect("session slot poisoned").clone())
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        *self.slot.lock().expect("session slot poisoned") = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        *self.slot.lock().expect("session slot poisoned") = None;
        Ok(())
    }
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SessionStore for FileStore {
    fn load(&self) -> Result<Option<Session>, ClientError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(ClientError::Session(e)),
        };

        let session = serde_json::from_str(&raw)
            .map_err(|e| ClientError::shape(format!("session file {}: {e}", self.path.display())))?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(session)
            .map_err(|e| ClientError::shape(format!("session encode: {e}")))?;
        fs::write(&self.path, raw)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), ClientError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ClientError::Session(e)),
        }
    }
}

/// Owns the store plus the in-memory copy every caller reads. Writes go
/// through to the store so a later process sees the same session.
pub struct SessionManager {
    store: Box<dyn SessionStore>,
    current: Option<Session>,
}

impl SessionManager {
    /// Load whatever the store has. An unreadable session is logged and
    /// treated as logged out rather than wedging the client.
    pub fn new(store: Box<dyn SessionStore>) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("could not restore session, starting logged out: {e}");
                None
            }
        };
        Self { store, current }
    }

    pub fn session(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// The session, or [`ClientError::NotLoggedIn`] for guarded operations.
    pub fn require(&self) -> Result<&Session, ClientError> {
        self.current.as_ref().ok_or(ClientError::NotLoggedIn)
    }

    pub fn set_session(&mut self, session: Session) -> Result<(), ClientError> {
        self.store.save(&session)?;
        info!("session saved for {}", session.email);
        self.current = Some(session);
        Ok(())
    }

    pub fn clear_session(&mut self) -> Result<(), ClientError> {
        self.store.clear()?;
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Session {
        Session {
            token: "jwt-abc".into(),
            user_id: "u1".into(),
            email: "a@example.com".into(),
            username: "alice".into(),
            role: Role::User,
            phone_number: "0912345678".into(),
        }
    }

    #[test]
    fn memory_roundtrip() {
        let store = MemoryStore::new();
        store.save(&sample()).unwrap();
        assert_eq!(store.load().unwrap(), Some(sample()));
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_roundtrip_across_managers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut manager = SessionManager::new(Box::new(FileStore::new(path.clone())));
        assert!(manager.session().is_none());
        manager.set_session(sample()).unwrap();

        // a second manager over the same file restores the same fields
        let restored = SessionManager::new(Box::new(FileStore::new(path.clone())));
        assert_eq!(restored.session(), Some(&sample()));
    }

    #[test]
    fn clear_removes_the_file_and_guards_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let mut manager = SessionManager::new(Box::new(FileStore::new(path.clone())));
        manager.set_session(sample()).unwrap();
        manager.clear_session().unwrap();

        assert!(!path.exists());
        assert!(matches!(manager.require(), Err(ClientError::NotLoggedIn)));

        let fresh = SessionManager::new(Box::new(FileStore::new(path)));
        assert!(matches!(fresh.require(), Err(ClientError::NotLoggedIn)));
    }

    #[test]
    fn corrupt_file_starts_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "not json").unwrap();

        let manager = SessionManager::new(Box::new(FileStore::new(path)));
        assert!(manager.session().is_none());
    }

    #[test]
    fn missing_clear_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never-written.json"));
        store.clear().unwrap();
    }
}
