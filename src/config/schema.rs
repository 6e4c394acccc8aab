//! Configuration schema for Strata
//!
//! Configuration is stored at `~/.config/strata/config.toml`. Every value
//! has a default, so the file (and any section in it) is optional.
//! Environment variables override file values; see `ConfigManager`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Filesystem layout of the package store
    pub paths: PathsConfig,

    /// Registry settings for publishing
    pub registry: RegistryConfig,

    /// External tool bindings
    pub tools: ToolsConfig,
}

/// Package store filesystem layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Filesystem root the package store lives under
    pub fs_root: PathBuf,

    /// Package store install root. Derived from `fs_root` when unset.
    pub install_root: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            fs_root: PathBuf::from("/"),
            install_root: None,
        }
    }
}

/// Registry settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Registry URL prefix for pushed tags (empty = public registry)
    pub url: String,
}

/// External tool bindings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Package manager CLI binary
    pub pkg_bin: String,

    /// Image builder CLI binary
    pub docker_bin: String,

    /// Runtime package installed into the base layer rootfs
    pub base_package: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            pkg_bin: "spk".to_string(),
            docker_bin: "docker".to_string(),
            base_package: "core/spk".to_string(),
        }
    }
}

impl Config {
    /// Effective package store install root
    pub fn install_root(&self) -> PathBuf {
        self.paths
            .install_root
            .clone()
            .unwrap_or_else(|| self.paths.fs_root.join("strata"))
    }

    /// Registry prefix for publishable tags, `None` when using the public default
    pub fn registry_prefix(&self) -> Option<String> {
        if self.registry.url.is_empty() {
            None
        } else {
            Some(self.registry.url.clone())
        }
    }

    /// Public key cache directory under the install root
    pub fn key_cache_dir(&self) -> PathBuf {
        self.install_root().join("cache").join("keys")
    }
}
