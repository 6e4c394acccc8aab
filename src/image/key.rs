//! Cache key derivation
//!
//! A short content hash over the tool version and the canonical
//! dependency set. Independent invocations (different packages, different
//! machines) agree on whether two dependency sets are the same without a
//! central coordinator, which is what makes cross-package layer sharing
//! safe.

use crate::pkg::DependencySet;
use sha2::{Digest, Sha256};
use std::fmt;

/// Hex characters kept from the full digest
const CACHE_KEY_LEN: usize = 16;

/// Deterministic short hash identifying a dependency set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derive the key for a dependency set under a tool version.
    ///
    /// The hash input is the tool version concatenated with the
    /// space-joined canonical set; the key is the first 16 hex characters
    /// of the SHA-256 digest.
    pub fn derive(tool_version: &str, deps: &DependencySet) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(tool_version.as_bytes());
        hasher.update(deps.joined().as_bytes());

        let hash = hex::encode(hasher.finalize());
        Self(hash[..CACHE_KEY_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_known_value() {
        // SHA-256("1.0core/x core/y") = e72fea93e48d6d6e...
        let deps = DependencySet::from_refs(["core/x", "core/y"]);
        let key = CacheKey::derive("1.0", &deps);
        assert_eq!(key.as_str(), "e72fea93e48d6d6e");
    }

    #[test]
    fn derive_empty_set_known_value() {
        // SHA-256("1.0") = d0ff5974b6aa52cf...
        let deps = DependencySet::from_refs(Vec::<String>::new());
        let key = CacheKey::derive("1.0", &deps);
        assert_eq!(key.as_str(), "d0ff5974b6aa52cf");
    }

    #[test]
    fn derive_is_order_and_duplicate_independent() {
        let a = DependencySet::from_refs(["core/y", "core/x"]);
        let b = DependencySet::from_refs(["core/x", "core/y", "core/x"]);

        assert_eq!(CacheKey::derive("1.0", &a), CacheKey::derive("1.0", &b));
    }

    #[test]
    fn derive_changes_with_tool_version() {
        let deps = DependencySet::from_refs(["core/x"]);
        assert_ne!(
            CacheKey::derive("1.0", &deps),
            CacheKey::derive("1.1", &deps)
        );
    }

    #[test]
    fn derive_changes_with_deps() {
        let a = DependencySet::from_refs(["core/x"]);
        let b = DependencySet::from_refs(["core/y"]);
        assert_ne!(CacheKey::derive("1.0", &a), CacheKey::derive("1.0", &b));
    }

    #[test]
    fn key_is_short_lowercase_hex() {
        let deps = DependencySet::from_refs(["core/x"]);
        let key = CacheKey::derive("1.0", &deps);
        assert_eq!(key.as_str().len(), 16);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
