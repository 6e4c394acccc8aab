//! Configuration management for Strata
//!
//! The effective configuration is built exactly once at startup: file
//! values (if a config file exists), then environment overrides, then the
//! CLI `--repo` flag. Components receive the resulting `Config` by
//! reference and never read ambient process state themselves.

pub mod schema;

pub use schema::Config;

use crate::error::{StrataError, StrataResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Environment override for the package store filesystem root
pub const ENV_FS_ROOT: &str = "STRATA_FS_ROOT";

/// Environment override for the package store install root
pub const ENV_INSTALL_ROOT: &str = "STRATA_INSTALL_ROOT";

/// Environment override for the registry URL
pub const ENV_REGISTRY_URL: &str = "STRATA_REGISTRY_URL";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("strata")
    }

    /// Get the build contexts directory path
    pub fn builds_dir() -> PathBuf {
        Self::state_dir().join("builds")
    }

    /// Get the export report path
    pub fn report_path() -> PathBuf {
        Self::state_dir().join("last-export.json")
    }

    /// Load configuration with environment overrides applied.
    /// A missing config file is not an error; defaults are used.
    pub async fn load(&self) -> StrataResult<Config> {
        let mut config = if self.config_path.exists() {
            self.load_from_file(&self.config_path).await?
        } else {
            debug!("Config file not found, using defaults");
            Config::default()
        };

        apply_env_overrides(&mut config);
        Ok(config)
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> StrataResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| StrataError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| StrataError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> StrataResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            StrataError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> StrataResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StrataError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Ensure all state directories exist
    pub async fn ensure_state_dirs() -> StrataResult<()> {
        let dirs = [Self::state_dir(), Self::builds_dir()];

        for dir in &dirs {
            fs::create_dir_all(dir).await.map_err(|e| {
                StrataError::io(format!("creating directory {}", dir.display()), e)
            })?;
        }

        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply documented environment overrides on top of file/default values
fn apply_env_overrides(config: &mut Config) {
    if let Ok(root) = std::env::var(ENV_FS_ROOT) {
        if !root.is_empty() {
            config.paths.fs_root = PathBuf::from(root);
        }
    }
    if let Ok(root) = std::env::var(ENV_INSTALL_ROOT) {
        if !root.is_empty() {
            config.paths.install_root = Some(PathBuf::from(root));
        }
    }
    if let Ok(url) = std::env::var(ENV_REGISTRY_URL) {
        config.registry.url = url;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    fn clear_env() {
        std::env::remove_var(ENV_FS_ROOT);
        std::env::remove_var(ENV_INSTALL_ROOT);
        std::env::remove_var(ENV_REGISTRY_URL);
    }

    #[tokio::test]
    #[serial]
    async fn load_default_when_missing() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.tools.pkg_bin, "spk");
        assert_eq!(config.install_root(), PathBuf::from("/strata"));
    }

    #[tokio::test]
    #[serial]
    async fn save_and_load_roundtrip() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.registry.url = "registry.example.com".to_string();

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.registry.url, "registry.example.com");
    }

    #[tokio::test]
    #[serial]
    async fn env_overrides_file_values() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[paths]\nfs_root = \"/from-file\"\n").unwrap();

        std::env::set_var(ENV_FS_ROOT, "/from-env");
        std::env::set_var(ENV_REGISTRY_URL, "registry.env.example");

        let config = ConfigManager::with_path(path).load().await.unwrap();
        clear_env();

        assert_eq!(config.paths.fs_root, PathBuf::from("/from-env"));
        assert_eq!(config.registry.url, "registry.env.example");
        assert_eq!(config.install_root(), PathBuf::from("/from-env/strata"));
    }

    #[tokio::test]
    #[serial]
    async fn install_root_env_wins_over_derivation() {
        clear_env();
        std::env::set_var(ENV_FS_ROOT, "/a");
        std::env::set_var(ENV_INSTALL_ROOT, "/b/store");

        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join("none.toml"));
        let config = manager.load().await.unwrap();
        clear_env();

        assert_eq!(config.install_root(), PathBuf::from("/b/store"));
    }

    #[tokio::test]
    #[serial]
    async fn invalid_config_file_errors() {
        clear_env();
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "registry = \"not a table\"").unwrap();

        let result = ConfigManager::with_path(path).load().await;
        assert!(matches!(result, Err(StrataError::ConfigInvalid { .. })));
    }
}
