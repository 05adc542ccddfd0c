//! Error types for hostbook-resolver

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while resolving inventory data
#[derive(Error, Debug, Clone)]
pub enum ResolverError {
    /// The inventory engine CLI is not installed
    #[error("inventory engine not found: {0}")]
    EngineNotFound(String),

    /// The engine exited with a failure (malformed source, unreachable path)
    #[error("inventory resolution failed: {0}")]
    ResolutionFailed(String),

    /// Failed to parse the engine's JSON export
    #[error("JSON parse error: {0}")]
    ParseError(String),

    /// Failed to spawn the engine process
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error while driving the engine
    #[error("I/O error: {0}")]
    IoError(String),

    /// Engine invocation timed out
    #[error("resolution timeout after {0:?}")]
    Timeout(Duration),
}

impl ResolverError {
    /// Check if error is retryable
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, ResolverError::IoError(_) | ResolverError::Timeout(_))
    }

    /// Check if the engine needs to be installed
    #[must_use]
    pub fn needs_installation(&self) -> bool {
        matches!(self, ResolverError::EngineNotFound(_))
    }
}
