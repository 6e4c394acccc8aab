//! Image builder abstraction
//!
//! Provides a trait for image operations that can be implemented by
//! different backends. The production backend shells out to the Docker
//! CLI; tests use a recording mock.

use crate::config::Config;
use crate::error::{StrataError, StrataResult};
use crate::image::tag::ImageTag;
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Abstract image builder interface
#[async_trait]
pub trait ImageBuilder: Send + Sync {
    /// Ensure the builder is usable (binary present, daemon reachable)
    async fn ensure_ready(&self) -> StrataResult<()>;

    /// Check if a tag exists in the local image index. A pure query:
    /// never mutates builder state.
    async fn image_exists(&self, tag: &ImageTag) -> StrataResult<bool>;

    /// Build an image from a context directory and tag it
    async fn build(&self, context: &Path, tag: &ImageTag) -> StrataResult<()>;

    /// Apply an additional tag to an existing image
    async fn tag(&self, source: &ImageTag, dest: &ImageTag) -> StrataResult<()>;

    /// Push a tag to its registry
    async fn push(&self, tag: &ImageTag) -> StrataResult<()>;

    /// Run the size-reduction step on a built image, replacing the tag
    async fn slim(&self, tag: &ImageTag) -> StrataResult<()>;

    /// Human-readable backend name for display
    fn builder_name(&self) -> &'static str;
}

/// Image builder backed by the Docker CLI
pub struct DockerCli {
    bin: String,
}

/// Binary used for the optional size-reduction step
const SLIM_BIN: &str = "docker-slim";

impl DockerCli {
    /// Create a builder handle from configuration
    pub fn new(config: &Config) -> Self {
        Self {
            bin: config.tools.docker_bin.clone(),
        }
    }

    /// Check if the Docker CLI is installed
    async fn docker_installed(&self) -> bool {
        Command::new(&self.bin)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Execute a Docker command and return the output
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
impl ImageBuilder for DockerCli {
    async fn ensure_ready(&self) -> StrataResult<()> {
        if !self.docker_installed().await {
            return Err(StrataError::DockerNotFound);
        }
        Ok(())
    }

    async fn image_exists(&self, tag: &ImageTag) -> StrataResult<bool> {
        let rendered = tag.to_string();
        let output = self.exec(&["image", "inspect", &rendered]).await?;
        Ok(output.status.success())
    }

    async fn build(&self, context: &Path, tag: &ImageTag) -> StrataResult<()> {
        let rendered = tag.to_string();
        let context_str = context.display().to_string();
        info!("Building image: {}", rendered);

        let output = self.exec(&["build", "-t", &rendered, &context_str]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let combined = super::build_error_output(&stdout, &stderr);
            return Err(StrataError::ImageBuild {
                tag: rendered,
                reason: combined,
            });
        }

        Ok(())
    }

    async fn tag(&self, source: &ImageTag, dest: &ImageTag) -> StrataResult<()> {
        let source_str = source.to_string();
        let dest_str = dest.to_string();
        debug!("Tagging {} as {}", source_str, dest_str);

        let output = self.exec(&["tag", &source_str, &dest_str]).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(StrataError::ImageTag {
                source_tag: source_str,
                dest_tag: dest_str,
                reason: stderr.trim().to_string(),
            })
        }
    }

    async fn push(&self, tag: &ImageTag) -> StrataResult<()> {
        let rendered = tag.to_string();
        info!("Pushing image: {}", rendered);

        let output = self.exec(&["push", &rendered]).await?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(StrataError::PushFailed {
                tag: rendered,
                reason: stderr.trim().to_string(),
            })
        }
    }

    async fn slim(&self, tag: &ImageTag) -> StrataResult<()> {
        let rendered = tag.to_string();
        info!("Slimming image: {}", rendered);

        let output = Command::new(SLIM_BIN)
            .args(["build", "--target", &rendered, "--tag", &rendered])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| StrataError::command_failed(format!("{} build", SLIM_BIN), e))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(StrataError::command_exec(
                format!("{} build --target {}", SLIM_BIN, rendered),
                stderr,
            ))
        }
    }

    fn builder_name(&self) -> &'static str {
        "Docker"
    }
}
