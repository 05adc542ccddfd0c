//! Resolver output types

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single host as reported by the inventory engine
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedHost {
    /// Groups the host belongs to, the implicit `all` excluded
    pub groups: Vec<String>,
    /// Fully resolved variable bag
    ///
    /// Always contains `inventory_hostname` (string) and `group_names`
    /// (array of strings).
    pub vars: Map<String, Value>,
}

/// Full inventory as reported by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedInventory {
    /// Hosts keyed by inventory hostname
    pub hosts: BTreeMap<String, ResolvedHost>,
    /// When this data was resolved
    pub resolved_at: DateTime<Utc>,
}

impl ResolvedInventory {
    /// Create a new empty inventory
    #[must_use]
    pub fn new() -> Self {
        Self {
            hosts: BTreeMap::new(),
            resolved_at: Utc::now(),
        }
    }

    /// The full set of resolved hostnames
    #[must_use]
    pub fn hostnames(&self) -> HashSet<String> {
        self.hosts.keys().cloned().collect()
    }
}

impl Default for ResolvedInventory {
    fn default() -> Self {
        Self::new()
    }
}
