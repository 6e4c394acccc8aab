//! Dependency set collection
//!
//! Unions the declared dependency lists of one or more seed packages into
//! a canonical ordering: deduplicated, sorted lexicographically. The same
//! seed set always yields the same sequence regardless of input order or
//! duplication, which is what makes the cache key deterministic.

use crate::error::StrataResult;
use crate::pkg::meta;
use crate::pkg::store::PackageStore;
use std::collections::BTreeSet;
use tracing::debug;

/// Canonically ordered, deduplicated dependency set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencySet(Vec<String>);

impl DependencySet {
    /// Build a set from arbitrary references (deduplicates and sorts)
    pub fn from_refs<I, S>(refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = refs.into_iter().map(Into::into).collect();
        Self(set.into_iter().collect())
    }

    /// True when no seed declared any dependency
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of dependencies
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Space-joined canonical serialization (cache key input)
    pub fn joined(&self) -> String {
        self.0.join(" ")
    }
}

/// Collect the union of the seeds' declared dependency lists.
///
/// Each seed is installed first if absent (idempotent). A seed with no
/// DEPS file contributes nothing; that is a normal state, not an error.
pub async fn collect(store: &dyn PackageStore, seeds: &[String]) -> StrataResult<DependencySet> {
    let mut union: BTreeSet<String> = BTreeSet::new();

    for seed in seeds {
        let resolved = meta::resolve(store, seed).await?;
        let deps = meta::dependencies(&resolved.path).await?;
        debug!("{} declares {} dependencies", seed, deps.len());
        union.extend(deps);
    }

    Ok(DependencySet(union.into_iter().collect()))
}
