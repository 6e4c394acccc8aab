//! Layer assembly
//!
//! Builds the three image layers of an export in strict order: base
//! runtime, shared dependencies, application. Each layer starts only
//! after the previous layer's tag is finalized. The base and shared
//! layers are content-cached: an existing tag skips the build entirely,
//! and an existing alias under the shared namespace is reused so that
//! unrelated packages with identical dependency sets converge on one
//! physical image.

use crate::error::StrataResult;
use crate::image::builder::ImageBuilder;
use crate::image::context::BuildContext;
use crate::image::tag::{ImageTag, TagSet};
use crate::pkg::store::PackageStore;
use crate::pkg::{DependencySet, PackageIdent, ResolvedPackage};
use std::path::PathBuf;
use tracing::{debug, info};

/// Control gateway port exposed by every exported image
pub const CONTROL_GATEWAY_PORT: u16 = 9631;

/// Owner (uid:gid) of the service data and config mount points
const SVC_OWNER: &str = "42:42";

/// How a layer's tag came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerOutcome {
    /// Image was built in this invocation
    Built,

    /// Tag already existed; build skipped
    Cached,

    /// Existing alias image was re-tagged and reused
    Aliased,

    /// Empty dependency set; the base image was tagged through
    PassThrough,
}

impl LayerOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Built => "built",
            Self::Cached => "cached",
            Self::Aliased => "aliased",
            Self::PassThrough => "pass-through",
        }
    }
}

/// Decision for the shared dependency layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedAction {
    /// Tag already exists; nothing to do
    Skip,

    /// Alias exists under the shared namespace; re-tag and rebind
    Alias,

    /// No dependencies; tag the base image through
    PassThrough,

    /// Build the layer and tag it under both namespaces
    Build,
}

/// Pick the shared-layer transition from the two existence probes and the
/// dependency set. Pure so every branch is testable without a builder.
pub fn shared_layer_action(
    shared_exists: bool,
    alias_exists: bool,
    deps_empty: bool,
) -> SharedAction {
    if shared_exists {
        SharedAction::Skip
    } else if alias_exists {
        SharedAction::Alias
    } else if deps_empty {
        SharedAction::PassThrough
    } else {
        SharedAction::Build
    }
}

/// Result of a full three-layer assembly
#[derive(Debug)]
pub struct Assembly {
    /// Final tag set. `shared` points at the alias name if one was reused.
    pub tags: TagSet,

    pub base: LayerOutcome,
    pub shared: LayerOutcome,
    pub app: LayerOutcome,
}

/// Orchestrates the three layer builds for one export
pub struct LayerAssembler<'a> {
    builder: &'a dyn ImageBuilder,
    store: &'a dyn PackageStore,
    builds_dir: PathBuf,
    base_package: String,
    slim: bool,
}

impl<'a> LayerAssembler<'a> {
    pub fn new(
        builder: &'a dyn ImageBuilder,
        store: &'a dyn PackageStore,
        config: &crate::config::Config,
        slim: bool,
    ) -> Self {
        Self {
            builder,
            store,
            builds_dir: crate::config::ConfigManager::builds_dir(),
            base_package: config.tools.base_package.clone(),
            slim,
        }
    }

    /// Override the build context base directory
    pub fn with_builds_dir(mut self, dir: PathBuf) -> Self {
        self.builds_dir = dir;
        self
    }

    /// Assemble all three layers. Layers run strictly in order; a failure
    /// aborts the remainder, leaving earlier tags as valid cache entries.
    pub async fn assemble(
        &self,
        pkg: &ResolvedPackage,
        deps: &DependencySet,
        ports: &[u16],
        mut tags: TagSet,
    ) -> StrataResult<Assembly> {
        let base = self.base_layer(&tags.base).await?;
        let shared = self.shared_layer(&mut tags, deps).await?;
        let app = self.app_layer(&tags, pkg, ports).await?;

        Ok(Assembly {
            tags,
            base,
            shared,
            app,
        })
    }

    async fn base_layer(&self, tag: &ImageTag) -> StrataResult<LayerOutcome> {
        if self.builder.image_exists(tag).await? {
            info!("Base runtime layer cached: {}", tag);
            return Ok(LayerOutcome::Cached);
        }

        info!("Building base runtime layer: {}", tag);
        let ctx = BuildContext::create_in(&self.builds_dir, "base").await?;
        self.store
            .install_to_root(&self.base_package, &ctx.path().join("rootfs"))
            .await?;
        ctx.write_file("Dockerfile", &base_dockerfile()).await?;
        self.builder.build(ctx.path(), tag).await?;
        ctx.close().await?;

        if self.slim {
            self.builder.slim(tag).await?;
        }

        Ok(LayerOutcome::Built)
    }

    async fn shared_layer(
        &self,
        tags: &mut TagSet,
        deps: &DependencySet,
    ) -> StrataResult<LayerOutcome> {
        let shared_exists = self.builder.image_exists(&tags.shared).await?;
        let alias_exists = self.builder.image_exists(&tags.shared_alias).await?;
        let action = shared_layer_action(shared_exists, alias_exists, deps.is_empty());
        debug!("Shared layer action: {:?}", action);

        // The existence probes are advisory: another invocation may create
        // the same alias between the check and the build/tag below. Tagging
        // is last-write-wins, so a lost race duplicates work, never state.
        match action {
            SharedAction::Skip => {
                info!("Shared dependency layer cached: {}", tags.shared);
                Ok(LayerOutcome::Cached)
            }
            SharedAction::Alias => {
                info!(
                    "Reusing shared dependency image {} for {}",
                    tags.shared_alias, tags.shared
                );
                self.builder.tag(&tags.shared_alias, &tags.shared).await?;
                // Rebind so layer 3 and the publisher see the alias name
                tags.shared = tags.shared_alias.clone();
                Ok(LayerOutcome::Aliased)
            }
            SharedAction::PassThrough => {
                info!("No dependencies; passing base layer through");
                self.builder.tag(&tags.base, &tags.shared).await?;
                self.builder.tag(&tags.base, &tags.shared_alias).await?;
                Ok(LayerOutcome::PassThrough)
            }
            SharedAction::Build => {
                info!(
                    "Building shared dependency layer: {} ({} deps)",
                    tags.shared,
                    deps.len()
                );
                let ctx = BuildContext::create_in(&self.builds_dir, "deps").await?;
                ctx.copy_dir(&self.store.key_cache_dir(), "keys").await?;
                ctx.write_file("Dockerfile", &shared_dockerfile(&tags.base, deps))
                    .await?;
                self.builder.build(ctx.path(), &tags.shared).await?;
                ctx.close().await?;

                if self.slim {
                    self.builder.slim(&tags.shared).await?;
                }

                self.builder.tag(&tags.shared, &tags.shared_alias).await?;
                Ok(LayerOutcome::Built)
            }
        }
    }

    /// The application layer always builds: it embeds the exact resolved
    /// release and is never cached across invocations.
    async fn app_layer(
        &self,
        tags: &TagSet,
        pkg: &ResolvedPackage,
        ports: &[u16],
    ) -> StrataResult<LayerOutcome> {
        info!("Building application layer: {}", tags.run_version);
        let ctx = BuildContext::create_in(&self.builds_dir, "app").await?;
        ctx.copy_dir(&self.store.key_cache_dir(), "keys").await?;
        ctx.write_file(
            "Dockerfile",
            &app_dockerfile(&tags.shared, &pkg.ident, ports),
        )
        .await?;
        self.builder.build(ctx.path(), &tags.run_version).await?;
        ctx.close().await?;

        self.builder.tag(&tags.run_version, &tags.run_latest).await?;
        Ok(LayerOutcome::Built)
    }
}

/// Dockerfile for the base runtime layer: the store-provided rootfs over
/// an empty image.
fn base_dockerfile() -> String {
    let lines = vec![
        "FROM scratch".to_string(),
        "COPY rootfs/ /".to_string(),
        "ENV PATH=/bin:/sbin".to_string(),
        "CMD [\"/bin/sh\"]".to_string(),
    ];
    lines.join("\n")
}

/// Dockerfile for the shared dependency layer.
///
/// One RUN per dependency for builder cache granularity; dependencies are
/// already in canonical order, so identical sets produce identical files.
fn shared_dockerfile(base: &ImageTag, deps: &DependencySet) -> String {
    let mut lines = vec![format!("FROM {}", base), String::new()];

    lines.push("COPY keys/ /strata/cache/keys/".to_string());
    lines.push(String::new());

    for dep in deps.iter() {
        lines.push(format!("RUN spk install {}", dep));
    }

    lines.join("\n")
}

/// Dockerfile for the application layer: install the exact release, stamp
/// the identity marker, provision the service mount points, expose ports,
/// and set the runtime entrypoint.
fn app_dockerfile(shared: &ImageTag, ident: &PackageIdent, ports: &[u16]) -> String {
    let svc_dir = format!("/strata/svc/{}", ident.name);
    let mut expose: Vec<u16> = vec![CONTROL_GATEWAY_PORT];
    expose.extend(ports.iter().filter(|p| **p != CONTROL_GATEWAY_PORT));

    let mut lines = vec![format!("FROM {}", shared), String::new()];

    lines.push("COPY keys/ /strata/cache/keys/".to_string());
    lines.push(format!("RUN spk install {}", ident));
    lines.push(format!("RUN echo '{}' > /strata/.primary_ident", ident));
    lines.push(format!(
        "RUN mkdir -p {svc}/data {svc}/config && chown -R {owner} {svc}",
        svc = svc_dir,
        owner = SVC_OWNER,
    ));
    lines.push(String::new());

    lines.push(format!(
        "VOLUME [\"{svc}/data\", \"{svc}/config\"]",
        svc = svc_dir
    ));
    let port_list: Vec<String> = expose.iter().map(|p| p.to_string()).collect();
    lines.push(format!("EXPOSE {}", port_list.join(" ")));
    lines.push("ENTRYPOINT [\"spk\", \"run\"]".to_string());
    lines.push(format!("CMD [\"{}\"]", ident.ident()));

    lines.join("\n")
}
