//! Scoped build contexts
//!
//! Each layer build gets a fresh directory holding exactly that layer's
//! inputs: the Dockerfile plus any rootfs or key material copied in. The
//! directory is deleted when the build finishes, on success and failure
//! alike; the `Drop` guard also covers cancellation, where the in-flight
//! future is dropped mid-build.

use crate::error::{StrataError, StrataResult};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// An ephemeral, exclusively owned build directory
#[derive(Debug)]
pub struct BuildContext {
    dir: PathBuf,
    cleaned: bool,
}

impl BuildContext {
    /// Create a fresh context under a base directory
    pub async fn create_in(base: &Path, purpose: &str) -> StrataResult<Self> {
        tokio::fs::create_dir_all(base)
            .await
            .map_err(|e| StrataError::io("creating builds directory", e))?;

        let dir = base.join(format!("{}-{}", purpose, Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| StrataError::io("creating build context", e))?;

        debug!("Created build context: {}", dir.display());
        Ok(Self {
            dir,
            cleaned: false,
        })
    }

    /// Path of the context directory
    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write a file into the context
    pub async fn write_file(&self, name: &str, content: &str) -> StrataResult<()> {
        let path = self.dir.join(name);
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| StrataError::io(format!("writing {}", path.display()), e))
    }

    /// Copy a directory tree into the context under `dest_name`.
    /// A missing source yields an empty destination directory (a store
    /// with no cached keys is a normal state).
    pub async fn copy_dir(&self, src: &Path, dest_name: &str) -> StrataResult<()> {
        let dest = self.dir.join(dest_name);
        tokio::fs::create_dir_all(&dest)
            .await
            .map_err(|e| StrataError::io(format!("creating {}", dest.display()), e))?;

        if !src.exists() {
            return Ok(());
        }

        copy_tree(src, &dest)
    }

    /// Delete the context. Called on the success path; the `Drop` guard
    /// handles failure and cancellation.
    pub async fn close(mut self) -> StrataResult<()> {
        self.cleaned = true;
        debug!("Removing build context: {}", self.dir.display());
        tokio::fs::remove_dir_all(&self.dir)
            .await
            .map_err(|e| StrataError::io(format!("removing {}", self.dir.display()), e))
    }
}

impl Drop for BuildContext {
    fn drop(&mut self) {
        if !self.cleaned {
            let _ = std::fs::remove_dir_all(&self.dir);
        }
    }
}

fn copy_tree(src: &Path, dest: &Path) -> StrataResult<()> {
    let entries = std::fs::read_dir(src)
        .map_err(|e| StrataError::io(format!("reading {}", src.display()), e))?;

    for entry in entries {
        let entry = entry.map_err(|e| StrataError::io(format!("reading {}", src.display()), e))?;
        let target = dest.join(entry.file_name());
        let file_type = entry
            .file_type()
            .map_err(|e| StrataError::io(format!("inspecting {}", entry.path().display()), e))?;

        if file_type.is_dir() {
            std::fs::create_dir_all(&target)
                .map_err(|e| StrataError::io(format!("creating {}", target.display()), e))?;
            copy_tree(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)
                .map_err(|e| StrataError::io(format!("copying to {}", target.display()), e))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn create_and_close_removes_dir() {
        let temp = TempDir::new().unwrap();
        let ctx = BuildContext::create_in(temp.path(), "base").await.unwrap();
        let path = ctx.path().to_path_buf();
        assert!(path.exists());

        ctx.close().await.unwrap();
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn drop_removes_dir() {
        let temp = TempDir::new().unwrap();
        let path = {
            let ctx = BuildContext::create_in(temp.path(), "deps").await.unwrap();
            ctx.write_file("Dockerfile", "FROM scratch").await.unwrap();
            ctx.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn contexts_are_unique_per_layer() {
        let temp = TempDir::new().unwrap();
        let a = BuildContext::create_in(temp.path(), "app").await.unwrap();
        let b = BuildContext::create_in(temp.path(), "app").await.unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[tokio::test]
    async fn write_file_lands_in_context() {
        let temp = TempDir::new().unwrap();
        let ctx = BuildContext::create_in(temp.path(), "base").await.unwrap();
        ctx.write_file("Dockerfile", "FROM scratch\n").await.unwrap();

        let content = std::fs::read_to_string(ctx.path().join("Dockerfile")).unwrap();
        assert_eq!(content, "FROM scratch\n");
    }

    #[tokio::test]
    async fn copy_dir_copies_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("keys");
        std::fs::create_dir_all(src.join("nested")).unwrap();
        std::fs::write(src.join("acme.pub"), "key material").unwrap();
        std::fs::write(src.join("nested").join("core.pub"), "more").unwrap();

        let ctx = BuildContext::create_in(temp.path(), "deps").await.unwrap();
        ctx.copy_dir(&src, "keys").await.unwrap();

        assert!(ctx.path().join("keys").join("acme.pub").exists());
        assert!(ctx.path().join("keys").join("nested").join("core.pub").exists());
    }

    #[tokio::test]
    async fn copy_dir_missing_source_is_empty_dir() {
        let temp = TempDir::new().unwrap();
        let ctx = BuildContext::create_in(temp.path(), "deps").await.unwrap();
        ctx.copy_dir(&temp.path().join("nope"), "keys").await.unwrap();

        assert!(ctx.path().join("keys").is_dir());
        assert_eq!(
            std::fs::read_dir(ctx.path().join("keys")).unwrap().count(),
            0
        );
    }
}
