//! Error types for Strata
//!
//! All modules use `StrataResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Strata operations
pub type StrataResult<T> = Result<T, StrataError>;

/// All errors that can occur in Strata
#[derive(Error, Debug)]
pub enum StrataError {
    // Environment errors
    #[error("Docker not found. Install from https://docs.docker.com/get-docker or your package manager")]
    DockerNotFound,

    #[error("Package manager CLI not found: {0}. It must be on PATH for exports to work")]
    PackageCliNotFound(String),

    // Package errors
    #[error("Package not found: {0}. Install failed to produce metadata for it")]
    PackageNotFound(String),

    #[error("Failed to install package {pkg}: {reason}")]
    InstallFailed { pkg: String, reason: String },

    #[error("Package metadata missing: no {file} at {path}")]
    MetadataMissing { file: &'static str, path: PathBuf },

    #[error("Invalid package metadata in {path}: {reason}")]
    MetadataInvalid { path: PathBuf, reason: String },

    #[error("Invalid package identifier '{ident}': {reason}")]
    IdentInvalid { ident: String, reason: String },

    // Image errors
    #[error("Image build failed for {tag}:\n{reason}")]
    ImageBuild { tag: String, reason: String },

    #[error("Failed to tag {source_tag} as {dest_tag}: {reason}")]
    ImageTag {
        source_tag: String,
        dest_tag: String,
        reason: String,
    },

    #[error("Failed to push {tag}: {reason}")]
    PushFailed { tag: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Process errors
    #[error("Command failed: {command}")]
    CommandFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command execution error: {command}, stderr: {stderr}")]
    CommandExecution { command: String, stderr: String },

    #[error("Interrupted")]
    Interrupted,

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl StrataError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a command failed error
    pub fn command_failed(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandFailed {
            command: command.into(),
            source,
        }
    }

    /// Create a command execution error
    pub fn command_exec(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CommandExecution {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DockerNotFound => Some("Install Docker from https://docs.docker.com/get-docker"),
            Self::PackageCliNotFound(_) => Some("Check that the package manager CLI is on PATH"),
            Self::PackageNotFound(_) => Some("Check the package identifier spelling and origin"),
            Self::PushFailed { .. } => {
                Some("Local images are intact; re-run with --push after fixing registry access")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StrataError::DockerNotFound;
        assert!(err.to_string().contains("Docker not found"));
    }

    #[test]
    fn error_hint() {
        let err = StrataError::PackageNotFound("acme/missing".to_string());
        assert_eq!(
            err.hint(),
            Some("Check the package identifier spelling and origin")
        );
        assert!(StrataError::Interrupted.hint().is_none());
    }

    #[test]
    fn push_failure_mentions_tag() {
        let err = StrataError::PushFailed {
            tag: "acme/foo:latest".to_string(),
            reason: "denied".to_string(),
        };
        assert!(err.to_string().contains("acme/foo:latest"));
        assert!(err.hint().unwrap().contains("Local images are intact"));
    }
}
