//! Export command - the front door for one invocation
//!
//! Resolves the package, collects its dependency set, derives the cache
//! key and tag set, assembles the three layers, optionally publishes, and
//! writes a machine-readable report into the state directory.

use crate::cli::args::Cli;
use crate::config::{Config, ConfigManager};
use crate::error::{StrataError, StrataResult};
use crate::image::{
    publish, Assembly, CacheKey, DockerCli, ImageBuilder, LayerAssembler, TagSet,
};
use crate::pkg::{self, DependencySet, SpkCli};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info};

/// Execute the export
pub async fn execute(args: &Cli, config: &Config) -> StrataResult<()> {
    let store = SpkCli::new(config);
    let builder = DockerCli::new(config);

    // Preflight both collaborators before any side effect
    builder.ensure_ready().await?;
    if !store.is_available().await {
        return Err(StrataError::PackageCliNotFound(store.bin().to_string()));
    }

    let pb = create_progress_bar(&format!("Resolving {}...", args.pkg));

    let resolved = pkg::resolve(&store, &args.pkg).await?;
    debug!("Exporting {}", resolved.ident);
    let ports = pkg::declared_ports(&resolved.path).await?;

    pb.set_message("Collecting dependencies...");
    let deps = pkg::collect(&store, std::slice::from_ref(&args.pkg)).await?;
    let key = CacheKey::derive(crate::TOOL_VERSION, &deps);
    info!("{} dependencies, cache key {}", deps.len(), key);

    let registry = args.repo.clone().or_else(|| config.registry_prefix());
    let tags = TagSet::compute(
        &resolved.ident,
        &key,
        registry,
        crate::TOOL_VERSION,
        args.slim,
    );

    pb.set_message("Assembling layers...");
    let assembler = LayerAssembler::new(&builder, &store, config, args.slim);
    let assembly = assembler.assemble(&resolved, &deps, &ports, tags).await?;

    if args.push {
        pb.set_message("Pushing tags...");
    }
    publish(&builder, &assembly.tags, args.push).await?;

    pb.finish_and_clear();

    write_report(&args.pkg, &key, &deps, &assembly).await?;
    print_summary(&assembly, args.push);

    Ok(())
}

/// Per-layer entry in the export report
#[derive(Serialize)]
struct LayerReport {
    tag: String,
    outcome: &'static str,
}

/// Machine-readable record of the last export, for higher-level drivers
#[derive(Serialize)]
struct ExportReport {
    package: String,
    cache_key: String,
    dependencies: Vec<String>,
    base: LayerReport,
    shared: LayerReport,
    app: LayerReport,
    shared_alias: String,
    run_latest: String,
}

async fn write_report(
    pkg: &str,
    key: &CacheKey,
    deps: &DependencySet,
    assembly: &Assembly,
) -> StrataResult<()> {
    let report = ExportReport {
        package: pkg.to_string(),
        cache_key: key.as_str().to_string(),
        dependencies: deps.iter().map(str::to_string).collect(),
        base: LayerReport {
            tag: assembly.tags.base.to_string(),
            outcome: assembly.base.as_str(),
        },
        shared: LayerReport {
            tag: assembly.tags.shared.to_string(),
            outcome: assembly.shared.as_str(),
        },
        app: LayerReport {
            tag: assembly.tags.run_version.to_string(),
            outcome: assembly.app.as_str(),
        },
        shared_alias: assembly.tags.shared_alias.to_string(),
        run_latest: assembly.tags.run_latest.to_string(),
    };

    let path = ConfigManager::report_path();
    let content = serde_json::to_string_pretty(&report)?;
    tokio::fs::write(&path, content)
        .await
        .map_err(|e| StrataError::io(format!("writing report to {}", path.display()), e))?;

    debug!("Export report written to {}", path.display());
    Ok(())
}

fn print_summary(assembly: &Assembly, pushed: bool) {
    println!(
        "{} Exported {}",
        style("✓").green(),
        style(&assembly.tags.run_version).cyan()
    );
    println!(
        "  base:  {} ({})",
        assembly.tags.base,
        assembly.base.as_str()
    );
    println!(
        "  deps:  {} ({})",
        assembly.tags.shared,
        assembly.shared.as_str()
    );
    println!(
        "  run:   {} (also tagged {})",
        assembly.tags.run_version, assembly.tags.run_latest
    );
    if pushed {
        println!("  {} pushed 4 tags", style("✓").green());
    }
}

fn create_progress_bar(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
