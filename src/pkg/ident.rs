//! Package identity
//!
//! A fully qualified package identifier has four slash-delimited parts:
//! `origin/name/version/release`. The IDENT metadata file always carries
//! the fully qualified form.

use crate::error::{StrataError, StrataResult};
use std::fmt;
use std::str::FromStr;

/// Fully qualified package identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIdent {
    /// Origin namespace (e.g. "core")
    pub origin: String,

    /// Package name
    pub name: String,

    /// Package version
    pub version: String,

    /// Release timestamp string
    pub release: String,
}

impl PackageIdent {
    /// Two-part identifier: `origin/name`
    pub fn ident(&self) -> String {
        format!("{}/{}", self.origin, self.name)
    }

    /// Image label for the run tag: `version-release`
    pub fn version_tag(&self) -> String {
        format!("{}-{}", self.version, self.release)
    }
}

impl fmt::Display for PackageIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.origin, self.name, self.version, self.release
        )
    }
}

impl FromStr for PackageIdent {
    type Err = StrataError;

    fn from_str(s: &str) -> StrataResult<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 4 {
            return Err(StrataError::IdentInvalid {
                ident: s.to_string(),
                reason: format!("expected origin/name/version/release, got {} parts", parts.len()),
            });
        }
        if parts.iter().any(|p| p.is_empty()) {
            return Err(StrataError::IdentInvalid {
                ident: s.to_string(),
                reason: "empty identifier segment".to_string(),
            });
        }

        Ok(Self {
            origin: parts[0].to_string(),
            name: parts[1].to_string(),
            version: parts[2].to_string(),
            release: parts[3].to_string(),
        })
    }
}
