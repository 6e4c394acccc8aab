//! Package store integration
//!
//! Resolves package identity and dependency metadata through the package
//! manager CLI. The store itself is an external collaborator; this module
//! wraps it behind the `PackageStore` trait and reads the metadata files
//! it leaves at each installed path.

pub mod deps;
pub mod ident;
pub mod meta;
pub mod store;

pub use deps::{collect, DependencySet};
pub use ident::PackageIdent;
pub use meta::{declared_ports, resolve, short_name, ResolvedPackage};
pub use store::{PackageStore, SpkCli};
