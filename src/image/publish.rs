//! Publishing
//!
//! Pushes the publishable tag set to the configured registry. Gated on
//! the push flag; a push failure is surfaced to the caller but the local
//! images stay tagged and usable.

use crate::error::StrataResult;
use crate::image::builder::ImageBuilder;
use crate::image::tag::TagSet;
use tracing::{debug, info};

/// Push the four publishable tags: shared, shared alias, run:version and
/// run:latest. The base runtime tag is host-local and never pushed.
pub async fn publish(
    builder: &dyn ImageBuilder,
    tags: &TagSet,
    enabled: bool,
) -> StrataResult<()> {
    if !enabled {
        debug!("Push disabled, skipping publish");
        return Ok(());
    }

    for tag in [
        &tags.shared,
        &tags.shared_alias,
        &tags.run_version,
        &tags.run_latest,
    ] {
        info!("Pushing {}", tag);
        builder.push(tag).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::key::CacheKey;
    use crate::image::testing::MockBuilder;
    use crate::pkg::{DependencySet, PackageIdent};

    fn tag_set() -> TagSet {
        let ident: PackageIdent = "acme/foo/1.2.3/20260801120000".parse().unwrap();
        let deps = DependencySet::from_refs(["core/x", "core/y"]);
        let key = CacheKey::derive("0.3.1", &deps);
        TagSet::compute(&ident, &key, None, "0.3.1", false)
    }

    #[tokio::test]
    async fn disabled_pushes_nothing() {
        let builder = MockBuilder::new();
        publish(&builder, &tag_set(), false).await.unwrap();
        assert!(builder.pushed_tags().is_empty());
    }

    #[tokio::test]
    async fn enabled_pushes_exactly_four_tags() {
        let builder = MockBuilder::new();
        let tags = tag_set();
        publish(&builder, &tags, true).await.unwrap();

        assert_eq!(
            builder.pushed_tags(),
            vec![
                tags.shared.to_string(),
                tags.shared_alias.to_string(),
                tags.run_version.to_string(),
                tags.run_latest.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn push_failure_surfaces() {
        let mut builder = MockBuilder::new();
        builder.fail_push = true;

        let result = publish(&builder, &tag_set(), true).await;
        assert!(result.is_err());
    }
}
