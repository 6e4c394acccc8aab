//! Package store abstraction
//!
//! Wraps the package manager CLI behind a trait so the resolver, the
//! dependency collector, and the layer assembler can be exercised against
//! an in-memory store in tests.

use crate::config::Config;
use crate::error::{StrataError, StrataResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Abstract package store interface
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Install a package into the local store. Idempotent: installing a
    /// package that is already present succeeds without side effects.
    async fn install(&self, pkg: &str) -> StrataResult<()>;

    /// Install a package into an alternate filesystem root, linking its
    /// binaries under `<root>/bin`. Used to materialize the base rootfs.
    async fn install_to_root(&self, pkg: &str, root: &Path) -> StrataResult<()>;

    /// Installed path for a package, or `None` if it is not present
    async fn installed_path(&self, pkg: &str) -> StrataResult<Option<PathBuf>>;

    /// Public key cache directory of the local store
    fn key_cache_dir(&self) -> PathBuf;
}

/// Package store backed by the `spk` CLI
pub struct SpkCli {
    bin: String,
    key_cache: PathBuf,
}

impl SpkCli {
    /// Create a store handle from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            bin: config.tools.pkg_bin.clone(),
            key_cache: config.key_cache_dir(),
        }
    }

    /// Configured CLI binary name
    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Check whether the CLI binary is runnable
    pub async fn is_available(&self) -> bool {
        Command::new(&self.bin)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Execute a store command and return the output
    async fn exec(&self, args: &[&str]) -> StrataResult<std::process::Output> {
        debug!("Executing: {} {:?}", self.bin, args);

        Command::new(&self.bin)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| StrataError::command_failed(format!("{} {:?}", self.bin, args), e))
    }
}

#[async_trait]
impl PackageStore for SpkCli {
    async fn install(&self, pkg: &str) -> StrataResult<()> {
        info!("Installing package: {}", pkg);

        let output = self.exec(&["install", pkg]).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(StrataError::InstallFailed {
                pkg: pkg.to_string(),
                reason: stderr.trim().to_string(),
            })
        }
    }

    async fn install_to_root(&self, pkg: &str, root: &Path) -> StrataResult<()> {
        info!("Installing {} into rootfs {}", pkg, root.display());

        let root_str = root.display().to_string();
        let bin_dir = root.join("bin").display().to_string();
        let output = self
            .exec(&["install", "--root", &root_str, "--binlink", &bin_dir, pkg])
            .await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(StrataError::InstallFailed {
                pkg: pkg.to_string(),
                reason: stderr.trim().to_string(),
            })
        }
    }

    async fn installed_path(&self, pkg: &str) -> StrataResult<Option<PathBuf>> {
        let output = self.exec(&["path", pkg]).await?;

        // Non-zero here means "not installed", not a failure
        if !output.status.success() {
            return Ok(None);
        }

        let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if path.is_empty() {
            return Ok(None);
        }

        Ok(Some(PathBuf::from(path)))
    }

    fn key_cache_dir(&self) -> PathBuf {
        self.key_cache.clone()
    }
}
