//! Transport execution
//!
//! Runs a [`SignedRequest`] through the external HTTP client and reports its
//! outcome. There is no retry: a failed request must be re-planned, since its
//! signature is tied to the moment it was signed.

use crate::plan::SignedRequest;
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Transport binary not found: {0}")]
    NotFound(String),

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}: {stderr}", exit_description(.code))]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("{program} timed out after {seconds}s")]
    Timeout { program: String, seconds: u64 },
}

fn exit_description(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Captured output of a successful transport run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransportOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Executes signed requests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Run the request to completion
    async fn execute(&self, request: &SignedRequest) -> Result<TransportOutput, TransportError>;
}

/// Runs requests as a child process (normally `curl`)
#[derive(Debug, Clone, Default)]
pub struct CommandTransport {
    timeout: Option<Duration>,
}

impl CommandTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the child and fail if it runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolve the transport binary through `PATH`.
    pub fn resolve(program: &str) -> Result<PathBuf, TransportError> {
        which::which(program).map_err(|_| TransportError::NotFound(program.to_string()))
    }
}

#[async_trait]
impl Transport for CommandTransport {
    #[tracing::instrument(
        name = "transport.execute",
        skip(self, request),
        fields(
            operation = %request.operation,
            http.method = request.method,
            url = %request.url,
        ),
        err
    )]
    async fn execute(&self, request: &SignedRequest) -> Result<TransportOutput, TransportError> {
        let program = Self::resolve(&request.program)?;
        debug!(program = %program.display(), "Resolved transport binary");

        let mut command = Command::new(&program);
        command
            .args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command.spawn().map_err(|source| TransportError::Spawn {
            program: request.program.clone(),
            source,
        })?;

        let output = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| TransportError::Timeout {
                    program: request.program.clone(),
                    seconds: limit.as_secs(),
                })?,
            None => child.wait_with_output().await,
        }
        .map_err(|source| TransportError::Spawn {
            program: request.program.clone(),
            source,
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(code = ?output.status.code(), "Transport failed");
            return Err(TransportError::Failed {
                program: request.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        info!(bytes = output.stdout.len(), "Request completed");

        Ok(TransportOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
