//! Accumulating host registry with shallow merge and limit pruning

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::record::{HostPatch, HostRecord};

/// Mapping from hostname to host record
///
/// Supports partial updates from multiple independent sources (fact seeding,
/// then the inventory merge) without clobbering previously recorded fields,
/// and a post-hoc prune to a limited host set. Ordered so downstream
/// consumers see deterministic iteration.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HostRegistry {
    hosts: BTreeMap<String, HostRecord>,
}

impl HostRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a partial update to `hostname`, creating the record on first mention
    ///
    /// Accepts any hostname and any patch shape; an empty patch only ensures
    /// the record exists. Later updates for the same host win for the fields
    /// they carry.
    pub fn update(&mut self, hostname: &str, patch: HostPatch) {
        self.hosts
            .entry(hostname.to_string())
            .or_insert_with(|| HostRecord::empty(hostname))
            .apply(patch);
    }

    /// Remove every record whose hostname is not in `limited`
    ///
    /// Pure set difference: names in `limited` that are not registered are
    /// no-ops, and an empty `limited` empties the registry.
    pub fn prune(&mut self, limited: &HashSet<String>) {
        self.hosts.retain(|name, _| limited.contains(name));
    }

    /// The current mapping of hostname to record
    #[must_use]
    pub fn get_hosts(&self) -> &BTreeMap<String, HostRecord> {
        &self.hosts
    }

    /// Look up a single record
    #[must_use]
    pub fn get(&self, hostname: &str) -> Option<&HostRecord> {
        self.hosts.get(hostname)
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    /// Check if the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
