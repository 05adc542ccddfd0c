//! Process execution seam for driving the inventory engine
//!
//! The resolver never parses inventory sources itself; it runs the engine CLI
//! through a [`CommandRunner`] so tests can substitute canned engine output.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument};

use crate::error::ResolverError;

/// Result of a command execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandOutput {
    /// Exit status code (0 for success)
    pub status: i32,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
    /// Time taken to execute
    pub duration: Duration,
}

impl CommandOutput {
    /// Check if command succeeded (exit code 0)
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Command execution abstraction
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion
    async fn run(&self, cmd: &str) -> Result<CommandOutput, ResolverError>;

    /// Run a command with an upper bound on execution time
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandOutput, ResolverError>;

    /// Identifier for the runner implementation
    fn runner_type(&self) -> &'static str;
}

/// Local command runner
///
/// Executes commands on the local machine using `tokio::process::Command`.
#[derive(Debug, Clone)]
pub struct LocalRunner;

impl LocalRunner {
    /// Create a new local runner
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self), level = "debug")]
    async fn execute(&self, cmd: &str) -> Result<CommandOutput, ResolverError> {
        let start = Instant::now();

        debug!(command = %cmd, "executing local command");

        // Use shell to support pipes, redirections, etc.
        let child = Command::new("sh")
            .arg("-c")
            .arg(cmd)
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped())
            .spawn()
            .map_err(|e| ResolverError::SpawnError(e.to_string()))?;

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ResolverError::IoError(e.to_string()))?;

        let duration = start.elapsed();

        let status = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        debug!(
            command = %cmd,
            status = status,
            duration = ?duration,
            "command completed"
        );

        if !output.status.success() {
            error!(
                command = %cmd,
                status = status,
                stderr = %stderr,
                "command failed"
            );
        }

        Ok(CommandOutput {
            status,
            stdout,
            stderr,
            duration,
        })
    }
}

impl Default for LocalRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    #[instrument(skip(self), level = "debug")]
    async fn run(&self, cmd: &str) -> Result<CommandOutput, ResolverError> {
        self.execute(cmd).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout_duration: Duration,
    ) -> Result<CommandOutput, ResolverError> {
        let start = Instant::now();

        debug!(command = %cmd, timeout = ?timeout_duration, "executing with timeout");

        let result = timeout(timeout_duration, self.execute(cmd)).await;

        match result {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(e),
            Err(_) => {
                error!(
                    command = %cmd,
                    timeout = ?timeout_duration,
                    elapsed = ?start.elapsed(),
                    "command timed out"
                );
                Err(ResolverError::Timeout(timeout_duration))
            }
        }
    }

    fn runner_type(&self) -> &'static str {
        "local"
    }
}
