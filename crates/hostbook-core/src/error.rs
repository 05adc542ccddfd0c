//! Error types for hostbook-core

use thiserror::Error;

use hostbook_resolver::ResolverError;

/// Errors that can occur while loading the registry
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    /// The inventory resolver failed; registry contents are undefined
    #[error("inventory resolution failed: {0}")]
    Resolver(#[from] ResolverError),

    /// A resolved host lacks a contract-guaranteed variable
    ///
    /// Never defaulted: guessing a hostname would corrupt the registry key
    /// space.
    #[error("host {host}: missing required var {key}")]
    MissingVar {
        /// Host as keyed by the resolver
        host: String,
        /// The absent variable
        key: &'static str,
    },

    /// A contract-guaranteed variable has the wrong shape
    #[error("host {host}: var {key} has an unexpected type")]
    InvalidVar {
        /// Host as keyed by the resolver
        host: String,
        /// The offending variable
        key: &'static str,
    },
}
