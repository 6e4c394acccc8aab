//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Strata - layered container image exporter
///
/// Exports a package as a container image built from three layers: a
/// base runtime, a shared dependency layer reusable across packages with
/// identical dependency sets, and the application itself.
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Package to export (e.g. acme/foo)
    #[arg(value_name = "PKG_REF")]
    pub pkg: String,

    /// Registry URL prefix for the published tags
    #[arg(long, value_name = "URL")]
    pub repo: Option<String>,

    /// Push the resulting tags to the registry
    #[arg(long)]
    pub push: bool,

    /// Run the size-reduction step on the cacheable layers
    #[arg(long)]
    pub slim: bool,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "STRATA_CONFIG")]
    pub config: Option<PathBuf>,
}
