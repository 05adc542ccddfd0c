//! Error types for hostbook-facts

use thiserror::Error;

/// Errors that can occur while loading fact files
#[derive(Error, Debug, Clone)]
pub enum FactError {
    /// A configured fact directory cannot be read
    #[error("cannot read fact directory: {0}")]
    DirUnreadable(String),
}
