//! Unified path management for Biglabs configuration files.
//!
//! All configuration, secrets, persisted sessions and logs live under one
//! configuration directory, resolved with the `dirs` crate unless a base
//! directory is supplied (tests, `--config-dir`).

use std::path::{Path, PathBuf};

use biglabs_core::config::{ClaudeConfig, DEFAULT_INSIGHT_MODEL, SecretConfig, SupabaseConfig};

const APP_DIR_NAME: &str = "biglabs";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Home directory could not be determined.
    HomeDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::HomeDirNotFound => write!(f, "Cannot find home directory"),
        }
    }
}

impl std::error::Error for PathError {}

/// Unified path management for Biglabs.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/biglabs/           # Config directory (or the supplied base)
/// ├── config.toml              # Application configuration
/// ├── secret.json              # Supabase and Anthropic credentials
/// ├── session.json             # Persisted auth session
/// └── logs/                    # Application logs
///     └── biglabs.log.YYYY-MM-DD
/// ```
#[derive(Debug, Clone, Default)]
pub struct BiglabsPaths {
    base: Option<PathBuf>,
}

impl BiglabsPaths {
    /// Creates a path resolver.
    ///
    /// # Arguments
    ///
    /// * `base` - Overrides the configuration directory when set
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory (e.g., `~/.config/biglabs/`)
    /// - `Err(PathError::HomeDirNotFound)`: Could not determine directory
    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }

        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::HomeDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("secret.json"))
    }

    /// Returns the path to the persisted auth session.
    pub fn session_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("session.json"))
    }

    /// Returns the path to the logs directory.
    pub fn logs_dir(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Ensures the secret file exists, creating it from a template if it doesn't.
    ///
    /// The template carries placeholder credentials, so a fresh install runs
    /// in demo mode until real values are filled in.
    ///
    /// # Security Note
    ///
    /// This function sets file permissions to 600 (user read/write only) on Unix systems.
    pub fn ensure_secret_file(&self) -> Result<PathBuf, std::io::Error> {
        let secret_path = self
            .secret_file()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()))?;

        if secret_path.exists() {
            return Ok(secret_path);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_config = SecretConfig {
            supabase: Some(SupabaseConfig {
                url: "https://placeholder.supabase.co".to_string(),
                anon_key: "placeholder-anon-key".to_string(),
            }),
            claude: Some(ClaudeConfig {
                api_key: String::new(),
                model_name: Some(DEFAULT_INSIGHT_MODEL.to_string()),
            }),
        };

        let template_json = serde_json::to_string_pretty(&template_config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        std::fs::write(&secret_path, template_json)?;
        restrict_permissions(&secret_path)?;

        Ok(secret_path)
    }
}

/// Sets file permissions to 600 on Unix.
pub(crate) fn restrict_permissions(path: &Path) -> Result<(), std::io::Error> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let permissions = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, permissions)?;
    }
    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use biglabs_core::auth::{AppMode, decide_mode};
    use tempfile::TempDir;

    #[test]
    fn test_files_live_under_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BiglabsPaths::new(Some(temp_dir.path()));

        assert_eq!(paths.config_dir().unwrap(), temp_dir.path());
        assert!(paths.config_file().unwrap().ends_with("config.toml"));
        assert!(paths.secret_file().unwrap().ends_with("secret.json"));
        assert!(paths.session_file().unwrap().ends_with("session.json"));
        assert!(paths.logs_dir().unwrap().starts_with(temp_dir.path()));
    }

    #[test]
    fn test_ensure_secret_file_writes_demo_template() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BiglabsPaths::new(Some(&temp_dir.path().join("nested")));

        let path = paths.ensure_secret_file().unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let config: SecretConfig = serde_json::from_str(&content).unwrap();

        assert_eq!(decide_mode(&config), AppMode::Demo);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_ensure_secret_file_keeps_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BiglabsPaths::new(Some(temp_dir.path()));
        let path = paths.secret_file().unwrap();
        std::fs::write(&path, "{}").unwrap();

        paths.ensure_secret_file().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");
    }
}
