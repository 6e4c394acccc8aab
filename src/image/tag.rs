//! Typed image tags
//!
//! Tags are computed once per export as a `TagSet`. Only the shared
//! dependency tag may be rebound afterwards, exactly once, when an alias
//! image is discovered (see the layer assembler).

use crate::image::key::CacheKey;
use crate::pkg::PackageIdent;
use std::fmt;

/// Repository path of the base runtime image (always local, never pushed)
const BASE_RUNTIME_PATH: &str = "strata/base-runtime";

/// Shared namespace that lets unrelated packages with identical
/// dependency sets converge on one physical image
const SHARED_ALIAS_NAME: &str = "shared_deps_base";

/// A fully specified image tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTag {
    /// Registry URL prefix (None = local / public default)
    registry: Option<String>,

    /// Repository path (e.g. "acme/foo")
    path: String,

    /// Tag label (e.g. "1.2.3-20260801120000")
    label: String,
}

impl ImageTag {
    /// Tag with an optional registry prefix
    pub fn new(registry: Option<String>, path: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            registry,
            path: path.into(),
            label: label.into(),
        }
    }

    /// Local-only tag (no registry prefix)
    pub fn local(path: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(None, path, label)
    }

    /// Same repository, different label
    pub fn with_label(&self, label: impl Into<String>) -> Self {
        Self {
            registry: self.registry.clone(),
            path: self.path.clone(),
            label: label.into(),
        }
    }
}

impl fmt::Display for ImageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.registry {
            Some(registry) => write!(f, "{}/{}:{}", registry, self.path, self.label),
            None => write!(f, "{}:{}", self.path, self.label),
        }
    }
}

/// The four logical tags tracked for one export
#[derive(Debug, Clone)]
pub struct TagSet {
    /// Base runtime layer, keyed by tool version (+ slim flag)
    pub base: ImageTag,

    /// Shared dependency layer under the package's own namespace.
    /// Rebound to the alias name when an alias image is reused.
    pub shared: ImageTag,

    /// Shared dependency layer under the cross-package alias namespace
    pub shared_alias: ImageTag,

    /// Final application image, versioned label
    pub run_version: ImageTag,

    /// Final application image, `latest` label
    pub run_latest: ImageTag,
}

impl TagSet {
    /// Compute the tag set for one export
    pub fn compute(
        ident: &PackageIdent,
        key: &CacheKey,
        registry: Option<String>,
        tool_version: &str,
        slim: bool,
    ) -> Self {
        let base_label = if slim {
            format!("{}-slim", tool_version)
        } else {
            tool_version.to_string()
        };

        let run = ImageTag::new(registry.clone(), ident.ident(), ident.version_tag());

        Self {
            base: ImageTag::local(BASE_RUNTIME_PATH, base_label),
            shared: ImageTag::new(
                registry.clone(),
                format!("{}/{}_deps", ident.origin, ident.name),
                key.as_str(),
            ),
            shared_alias: ImageTag::new(
                registry,
                format!("{}/{}", ident.origin, SHARED_ALIAS_NAME),
                key.as_str(),
            ),
            run_latest: run.with_label("latest"),
            run_version: run,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::DependencySet;

    fn ident() -> PackageIdent {
        "acme/foo/1.2.3/20260801120000".parse().unwrap()
    }

    fn key() -> CacheKey {
        CacheKey::derive("1.0", &DependencySet::from_refs(["core/x", "core/y"]))
    }

    #[test]
    fn render_without_registry() {
        let tag = ImageTag::local("acme/foo", "latest");
        assert_eq!(tag.to_string(), "acme/foo:latest");
    }

    #[test]
    fn render_with_registry() {
        let tag = ImageTag::new(
            Some("registry.example.com".to_string()),
            "acme/foo",
            "1.0-1",
        );
        assert_eq!(tag.to_string(), "registry.example.com/acme/foo:1.0-1");
    }

    #[test]
    fn with_label_keeps_repository() {
        let tag = ImageTag::new(Some("r.example".to_string()), "acme/foo", "1.0-1");
        assert_eq!(tag.with_label("latest").to_string(), "r.example/acme/foo:latest");
    }

    #[test]
    fn tag_set_layout() {
        let tags = TagSet::compute(&ident(), &key(), None, "0.3.1", false);

        assert_eq!(tags.base.to_string(), "strata/base-runtime:0.3.1");
        assert_eq!(
            tags.shared.to_string(),
            format!("acme/foo_deps:{}", key())
        );
        assert_eq!(
            tags.shared_alias.to_string(),
            format!("acme/shared_deps_base:{}", key())
        );
        assert_eq!(
            tags.run_version.to_string(),
            "acme/foo:1.2.3-20260801120000"
        );
        assert_eq!(tags.run_latest.to_string(), "acme/foo:latest");
    }

    #[test]
    fn tag_set_slim_suffix() {
        let tags = TagSet::compute(&ident(), &key(), None, "0.3.1", true);
        assert_eq!(tags.base.to_string(), "strata/base-runtime:0.3.1-slim");
    }

    #[test]
    fn tag_set_registry_prefix_skips_base() {
        let tags = TagSet::compute(
            &ident(),
            &key(),
            Some("registry.example.com".to_string()),
            "0.3.1",
            false,
        );

        // Base stays local; publishable tags carry the prefix
        assert_eq!(tags.base.to_string(), "strata/base-runtime:0.3.1");
        assert!(tags.shared.to_string().starts_with("registry.example.com/"));
        assert!(tags
            .shared_alias
            .to_string()
            .starts_with("registry.example.com/"));
        assert!(tags
            .run_version
            .to_string()
            .starts_with("registry.example.com/"));
    }

    #[test]
    fn identical_dep_sets_share_alias_tag() {
        let other: PackageIdent = "acme/bar/9.9/20260801000000".parse().unwrap();
        let tags_foo = TagSet::compute(&ident(), &key(), None, "0.3.1", false);
        let tags_bar = TagSet::compute(&other, &key(), None, "0.3.1", false);

        assert_eq!(
            tags_foo.shared_alias.to_string(),
            tags_bar.shared_alias.to_string()
        );
        assert_ne!(tags_foo.shared.to_string(), tags_bar.shared.to_string());
    }
}
