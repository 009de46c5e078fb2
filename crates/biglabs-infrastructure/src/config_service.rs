//! Configuration service implementation.
//!
//! Loads the root configuration from ~/.config/biglabs/config.toml.

use crate::paths::BiglabsPaths;
use biglabs_core::config::RootConfig;
use biglabs_core::{BiglabsError, Result};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing or empty config.toml yields defaults; an unreadable one is
/// logged and also yields defaults.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    pub fn new(paths: &BiglabsPaths) -> Self {
        let path = match paths.config_file() {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!("[ConfigService] {}; using default configuration", e);
                None
            }
        };

        Self {
            path,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|p| p.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = match self.load_config() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("[ConfigService] {}; using default configuration", e);
                RootConfig::default()
            }
        };

        {
            let mut write_lock = self.config.write().unwrap_or_else(|p| p.into_inner());
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|p| p.into_inner());
        *write_lock = None;
    }

    fn load_config(&self) -> Result<RootConfig> {
        let Some(path) = &self.path else {
            return Ok(RootConfig::default());
        };

        if !path.exists() {
            return Ok(RootConfig::default());
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(RootConfig::default());
        }

        toml::from_str(&content).map_err(|e| {
            BiglabsError::config(format!("Invalid {}: {}", path.display(), e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(&BiglabsPaths::new(Some(temp_dir.path())));
        assert_eq!(service.get_config(), RootConfig::default());
    }

    #[test]
    fn test_loads_and_reloads_after_invalidation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BiglabsPaths::new(Some(temp_dir.path()));
        let file = paths.config_file().unwrap();
        std::fs::write(&file, "log_level = \"debug\"\n[insights]\nmax_tokens = 512\n").unwrap();

        let service = ConfigService::new(&paths);
        let config = service.get_config();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.insights.max_tokens, 512);

        std::fs::write(&file, "log_level = \"warn\"\n").unwrap();
        assert_eq!(service.get_config().log_level, "debug");

        service.invalidate_cache();
        assert_eq!(service.get_config().log_level, "warn");
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BiglabsPaths::new(Some(temp_dir.path()));
        std::fs::write(paths.config_file().unwrap(), "log_level = [").unwrap();

        let service = ConfigService::new(&paths);
        assert_eq!(service.get_config(), RootConfig::default());
    }
}
