//! Inventory resolver trait

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::ResolverError;
use crate::types::ResolvedInventory;

/// Contract with the external inventory engine.
///
/// Implementations own inventory source parsing, variable precedence and
/// limit expression semantics (globs, set operators, exclusions); callers
/// only consume the normalized result.
#[async_trait]
pub trait InventoryResolver: Send + Sync {
    /// Resolve the full host set from the configured inventory sources.
    async fn resolve(&self) -> Result<ResolvedInventory, ResolverError>;

    /// Expand a limit expression against a known host set.
    ///
    /// Returns the subset of `hosts` the expression selects.
    async fn apply_limit(
        &self,
        limit: &str,
        hosts: &HashSet<String>,
    ) -> Result<HashSet<String>, ResolverError>;
}
