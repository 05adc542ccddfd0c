//! Host record and patch types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Per-host unit of truth
///
/// Combines inventory-declared membership and variables with locally gathered
/// facts. Fields default to empty until a source populates them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    /// Unique hostname identifier
    pub name: String,
    /// Groups the host belongs to (order is resolver-defined)
    #[serde(default)]
    pub groups: Vec<String>,
    /// Resolved variable bag
    #[serde(default)]
    pub hostvars: Map<String, Value>,
    /// Locally gathered facts
    #[serde(default)]
    pub facts: Map<String, Value>,
}

impl HostRecord {
    /// Create an empty record for `name`
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Apply a patch as a shallow field overwrite
    ///
    /// Each field present in the patch replaces the record's field wholesale.
    /// There is no deep merge: a patched `hostvars` replaces the entire
    /// previous mapping. Absent fields are left untouched.
    pub fn apply(&mut self, patch: HostPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(groups) = patch.groups {
            self.groups = groups;
        }
        if let Some(hostvars) = patch.hostvars {
            self.hostvars = hostvars;
        }
        if let Some(facts) = patch.facts {
            self.facts = facts;
        }
    }
}

/// Partial host record
///
/// Carries only the fields an update wants to overwrite.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostPatch {
    /// Replacement hostname identifier
    pub name: Option<String>,
    /// Replacement group memberships
    pub groups: Option<Vec<String>>,
    /// Replacement variable bag
    pub hostvars: Option<Map<String, Value>>,
    /// Replacement facts
    pub facts: Option<Map<String, Value>>,
}

impl HostPatch {
    /// Create an empty patch
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name field
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the groups field
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = Some(groups);
        self
    }

    /// Set the hostvars field
    #[must_use]
    pub fn with_hostvars(mut self, hostvars: Map<String, Value>) -> Self {
        self.hostvars = Some(hostvars);
        self
    }

    /// Set the facts field
    #[must_use]
    pub fn with_facts(mut self, facts: Map<String, Value>) -> Self {
        self.facts = Some(facts);
        self
    }
}
