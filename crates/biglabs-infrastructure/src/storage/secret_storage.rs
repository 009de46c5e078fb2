//! Reads `secret.json`.

use biglabs_core::config::SecretConfig;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum SecretStorageError {
    /// No secret file at the given path.
    NotFound(PathBuf),
    IoError(std::io::Error),
    ParseError(serde_json::Error),
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "no secret file at {}", path.display()),
            Self::IoError(e) => write!(f, "cannot read secret file: {}", e),
            Self::ParseError(e) => write!(f, "secret file is not valid JSON: {}", e),
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        Self::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        Self::ParseError(e)
    }
}

/// Read-only access to the credentials file.
///
/// Credentials are not validated here; `SecretConfig::usable_supabase` and
/// friends decide what counts as configured.
#[derive(Debug, Clone)]
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Parses the file. An empty file reads as an empty configuration.
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SecretStorageError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        warn_if_shared(&self.path);

        if content.trim().is_empty() {
            return Ok(SecretConfig::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

/// Logs when group or others can read the credentials.
fn warn_if_shared(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Ok(metadata) = fs::metadata(path) {
            let mode = metadata.permissions().mode();
            if mode & 0o077 != 0 {
                tracing::warn!(
                    "[SecretStorage] {} is accessible by other users (mode {:o}); run chmod 600",
                    path.display(),
                    mode & 0o777
                );
            }
        }
    }
    #[cfg(not(unix))]
    let _ = path;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn storage_in(temp_dir: &TempDir) -> SecretStorage {
        SecretStorage::with_path(temp_dir.path().join("secret.json"))
    }

    #[test]
    fn test_missing_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);

        match storage.load() {
            Err(SecretStorageError::NotFound(path)) => assert_eq!(&path, storage.path()),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_reads_both_sections() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        fs::write(
            storage.path(),
            r#"{
                "supabase": { "url": "https://abc.supabase.co", "anon_key": "anon-123" },
                "claude": { "api_key": "sk-ant-test", "model_name": "claude-sonnet-4-5-20250929" }
            }"#,
        )
        .unwrap();

        let config = storage.load().unwrap();
        let supabase = config.supabase.unwrap();
        assert_eq!(supabase.url, "https://abc.supabase.co");
        assert_eq!(supabase.anon_key, "anon-123");
        assert_eq!(config.claude.unwrap().api_key, "sk-ant-test");
    }

    #[test]
    fn test_empty_file_is_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        fs::write(storage.path(), "\n").unwrap();

        assert_eq!(storage.load().unwrap(), SecretConfig::default());
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = storage_in(&temp_dir);
        fs::write(storage.path(), "{ invalid json").unwrap();

        assert!(matches!(storage.load(), Err(SecretStorageError::ParseError(_))));
    }
}
