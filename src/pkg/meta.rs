//! Package metadata resolution
//!
//! The store leaves plain-text metadata files at each installed path:
//! `IDENT` (fully qualified identity, slash-delimited), `DEPS` (one
//! package reference per line) and `PORTS` (one port number per line).
//! `DEPS` and `PORTS` are optional; a package with neither is normal.

use crate::error::{StrataError, StrataResult};
use crate::pkg::ident::PackageIdent;
use crate::pkg::store::PackageStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const IDENT_FILE: &str = "IDENT";
const DEPS_FILE: &str = "DEPS";
const PORTS_FILE: &str = "PORTS";

/// A package resolved to its identity and installed path
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    /// Fully qualified identity from the IDENT file
    pub ident: PackageIdent,

    /// Installed path in the local store
    pub path: PathBuf,
}

/// Resolve a package reference, installing it if necessary.
///
/// Fails with `PackageNotFound` if installation does not produce metadata.
pub async fn resolve(store: &dyn PackageStore, pkg: &str) -> StrataResult<ResolvedPackage> {
    let path = match store.installed_path(pkg).await? {
        Some(path) => path,
        None => {
            info!("Package {} not installed, installing", pkg);
            store.install(pkg).await?;
            store
                .installed_path(pkg)
                .await?
                .ok_or_else(|| StrataError::PackageNotFound(pkg.to_string()))?
        }
    };

    let ident = read_ident(&path).await?;
    debug!("Resolved {} to {} at {}", pkg, ident, path.display());

    Ok(ResolvedPackage { ident, path })
}

/// Ports the package declares for exposure (empty if it declares none)
pub async fn declared_ports(path: &Path) -> StrataResult<Vec<u16>> {
    let ports_path = path.join(PORTS_FILE);
    let content = match tokio::fs::read_to_string(&ports_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StrataError::io(
                format!("reading {}", ports_path.display()),
                e,
            ))
        }
    };

    let mut ports = Vec::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let port: u16 = line.parse().map_err(|_| StrataError::MetadataInvalid {
            path: ports_path.clone(),
            reason: format!("invalid port number '{}'", line),
        })?;
        ports.push(port);
    }

    Ok(ports)
}

/// Declared dependency list of an installed package (empty if none)
pub async fn dependencies(path: &Path) -> StrataResult<Vec<String>> {
    let deps_path = path.join(DEPS_FILE);
    let content = match tokio::fs::read_to_string(&deps_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(StrataError::io(
                format!("reading {}", deps_path.display()),
                e,
            ))
        }
    };

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Last path segment of a package reference
pub fn short_name(pkg: &str) -> &str {
    pkg.rsplit('/').next().unwrap_or(pkg)
}

async fn read_ident(path: &Path) -> StrataResult<PackageIdent> {
    let ident_path = path.join(IDENT_FILE);
    let content = match tokio::fs::read_to_string(&ident_path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StrataError::MetadataMissing {
                file: IDENT_FILE,
                path: path.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(StrataError::io(
                format!("reading {}", ident_path.display()),
                e,
            ))
        }
    };

    content.parse()
}
