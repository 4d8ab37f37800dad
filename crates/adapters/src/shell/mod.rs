// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote shell transports
//!
//! A [`RemoteShell`] is one authenticated session to one instance. The
//! orchestrator never talks to a transport directly; it goes through
//! [`crate::RemoteRunner`], which builds the commands and interprets exit
//! codes.
//!
//! - [`SshShell`]: openssh client with a ControlMaster session per instance
//! - [`LocalShell`]: runs commands on this host under a sandbox root
//! - `FakeShell`: scripted responses and a call log (test-support)

mod local;
mod ssh;

pub use local::LocalShell;
pub use ssh::{SshConfig, SshShell};

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeShell, Journal};

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Errors from the transport itself, as opposed to a command exiting non-zero
#[derive(Debug, Error)]
pub enum ShellError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("stream error: {0}")]
    Io(#[from] std::io::Error),
    #[error("session already closed")]
    Closed,
}

/// Result of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// One session to one instance.
#[async_trait]
pub trait RemoteShell: Send + Sync + 'static {
    /// Run `command`, capturing stdout and stderr.
    async fn run(&self, command: &str) -> Result<CommandOutput, ShellError>;

    /// Run `command` with its stdout copied into `sink`.
    ///
    /// The returned output carries stderr and the exit code; stdout is empty.
    async fn run_with_stdout(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<CommandOutput, ShellError>;

    /// Run `command` with `source` copied into its stdin.
    async fn run_with_stdin(
        &self,
        command: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<CommandOutput, ShellError>;

    /// Login name of the session.
    fn username(&self) -> &str;

    /// Prefix for commands that need elevated privileges.
    fn sudo(&self) -> &str {
        "sudo "
    }

    /// Tear the session down. Called exactly once, by instance cleanup.
    async fn close(&self) -> Result<(), ShellError>;
}
