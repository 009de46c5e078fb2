//! Persisted auth session storage.
//!
//! Keeps the signed-in session in ~/.config/biglabs/session.json so a session
//! survives process restarts, the way a browser keeps it in local storage.

use biglabs_core::auth::AuthSession;
use std::fs;
use std::path::PathBuf;

use crate::paths::restrict_permissions;

/// Errors that can occur during session storage operations.
#[derive(Debug)]
pub enum SessionStorageError {
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing or serialization error.
    JsonError(serde_json::Error),
}

impl std::fmt::Display for SessionStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SessionStorageError::JsonError(e) => write!(f, "JSON error: {}", e),
        }
    }
}

impl std::error::Error for SessionStorageError {}

impl From<std::io::Error> for SessionStorageError {
    fn from(e: std::io::Error) -> Self {
        SessionStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SessionStorageError {
    fn from(e: serde_json::Error) -> Self {
        SessionStorageError::JsonError(e)
    }
}

/// Storage for the persisted session file (session.json).
///
/// Writes go through a temporary file and an atomic rename; the file is
/// readable by the owner only.
#[derive(Debug, Clone)]
pub struct SessionStorage {
    path: PathBuf,
}

impl SessionStorage {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the persisted session.
    ///
    /// Returns `Ok(None)` when no session has been saved.
    pub fn load(&self) -> Result<Option<AuthSession>, SessionStorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }

        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Saves the session, replacing any previous one.
    pub fn save(&self, session: &AuthSession) -> Result<(), SessionStorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, serde_json::to_string_pretty(session)?)?;
        restrict_permissions(&tmp_path)?;
        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    /// Removes the persisted session. Missing files are fine.
    pub fn clear(&self) -> Result<(), SessionStorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}
