//! hostbook-core: host registry merge model
//!
//! Accumulates per-host records from independent sources (fact seeding, the
//! inventory resolver) through shallow partial updates, then prunes to an
//! externally expanded limit set.

pub mod error;
pub mod loader;
pub mod record;
pub mod registry;

pub use error::LoadError;
pub use loader::InventoryLoader;
pub use record::{HostPatch, HostRecord};
pub use registry::HostRegistry;
