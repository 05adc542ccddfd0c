//! hostbook-resolver: inventory engine integration
//!
//! Defines the resolver contract for obtaining host, group and variable data
//! from an external configuration-management inventory engine, plus an
//! implementation that drives the engine's CLI export.

pub mod ansible;
pub mod error;
pub mod runner;
pub mod traits;
pub mod types;

pub use ansible::{AnsibleCliResolver, GROUP_NAMES, INVENTORY_HOSTNAME};
pub use error::ResolverError;
pub use runner::{CommandOutput, CommandRunner, LocalRunner};
pub use traits::InventoryResolver;
pub use types::{ResolvedHost, ResolvedInventory};
