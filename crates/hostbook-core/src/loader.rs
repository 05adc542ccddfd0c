//! Inventory load orchestration

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, instrument};

use hostbook_resolver::{GROUP_NAMES, INVENTORY_HOSTNAME, InventoryResolver};

use crate::error::LoadError;
use crate::record::HostPatch;
use crate::registry::HostRegistry;

/// Drives a full inventory load into a [`HostRegistry`]
///
/// Resolution happens once. When a limit expression is set it is expanded to
/// concrete hostnames up front, but the registry is pruned only after every
/// host has been merged: fact seeding may have created entries the limit
/// excludes, and the prune is the single source of truth for final
/// membership.
pub struct InventoryLoader {
    /// Inventory engine collaborator
    resolver: Arc<dyn InventoryResolver>,
    /// Limit expression, opaque to this crate
    limit: Option<String>,
}

impl InventoryLoader {
    /// Create a new loader
    pub fn new(resolver: Arc<dyn InventoryResolver>) -> Self {
        Self {
            resolver,
            limit: None,
        }
    }

    /// Set the limit expression handed to the resolver
    #[must_use]
    pub fn with_limit(mut self, limit: impl Into<String>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Merge resolved inventory data into `registry`
    ///
    /// # Errors
    /// Returns an error if resolution fails or a resolved host violates the
    /// resolver contract. On error the registry contents are undefined.
    #[instrument(skip(self, registry))]
    pub async fn load(&self, registry: &mut HostRegistry) -> Result<(), LoadError> {
        let inventory = self.resolver.resolve().await?;
        info!(hosts = inventory.hosts.len(), "inventory resolved");

        let limited = match &self.limit {
            Some(expr) => {
                let limited = self
                    .resolver
                    .apply_limit(expr, &inventory.hostnames())
                    .await?;
                info!(limit = %expr, hosts = limited.len(), "limit expanded");
                Some(limited)
            }
            None => None,
        };

        for (name, resolved) in &inventory.hosts {
            let hostname = resolved
                .vars
                .get(INVENTORY_HOSTNAME)
                .ok_or_else(|| LoadError::MissingVar {
                    host: name.clone(),
                    key: INVENTORY_HOSTNAME,
                })?
                .as_str()
                .ok_or_else(|| LoadError::InvalidVar {
                    host: name.clone(),
                    key: INVENTORY_HOSTNAME,
                })?;

            let group_names = resolved
                .vars
                .get(GROUP_NAMES)
                .ok_or_else(|| LoadError::MissingVar {
                    host: name.clone(),
                    key: GROUP_NAMES,
                })?;
            let groups = string_array(group_names).ok_or_else(|| LoadError::InvalidVar {
                host: name.clone(),
                key: GROUP_NAMES,
            })?;

            debug!(host = %hostname, groups = groups.len(), "merging host");

            registry.update(
                hostname,
                HostPatch::new()
                    .with_name(hostname)
                    .with_groups(groups)
                    .with_hostvars(resolved.vars.clone()),
            );
        }

        if let Some(limited) = limited {
            registry.prune(&limited);
            info!(hosts = registry.len(), "registry pruned to limit");
        }

        Ok(())
    }
}

/// Interpret a var as an array of strings
fn string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}
