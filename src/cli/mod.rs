//! Command-line interface for Strata

pub mod args;
pub mod export;

pub use args::Cli;
