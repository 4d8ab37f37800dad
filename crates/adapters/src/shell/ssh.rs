// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! openssh-backed transport.
//!
//! `connect` starts a ControlMaster in the background; every later command
//! multiplexes over its socket, so the instance is authenticated once and
//! `close` tears the one session down with `ssh -O exit`.

use super::{CommandOutput, RemoteShell, ShellError};
use crate::subprocess;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;

/// ssh reserves this exit status for its own failures.
const SSH_TRANSPORT_FAILURE: i32 = 255;

/// Connection parameters for one instance
#[derive(Debug, Clone)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub private_key: PathBuf,
    /// ssh client binary
    pub ssh_bin: String,
    /// Directory for the ControlMaster socket
    pub control_dir: PathBuf,
}

impl SshConfig {
    pub fn new(host: impl Into<String>, username: impl Into<String>, private_key: PathBuf) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            private_key,
            ssh_bin: "ssh".to_string(),
            control_dir: std::env::temp_dir(),
        }
    }

    bbr_core::setters! {
        into {
            ssh_bin: String,
            control_dir: PathBuf,
        }
        set {
            port: u16,
        }
    }
}

/// An authenticated ssh session to one instance.
pub struct SshShell {
    config: SshConfig,
    control_path: PathBuf,
    closed: Mutex<bool>,
}

impl SshShell {
    /// Authenticate and start the multiplexing master.
    pub async fn connect(config: SshConfig) -> Result<Self, ShellError> {
        let control_path = config.control_dir.join(format!("bbr-{}.sock", uuid::Uuid::new_v4()));
        let shell = Self { config, control_path, closed: Mutex::new(false) };

        let mut cmd = shell.base_command();
        cmd.args(["-M", "-N", "-f", "-o", "ControlPersist=yes"]).arg(shell.destination());
        tracing::debug!(host = %shell.config.host, "opening ssh session");
        let output = subprocess::capture(cmd).await?;
        if !output.success() {
            return Err(ShellError::Connection(format!(
                "{}@{}:{}: {}",
                shell.config.username,
                shell.config.host,
                shell.config.port,
                output.stderr.trim()
            )));
        }
        Ok(shell)
    }

    fn destination(&self) -> String {
        format!("{}@{}", self.config.username, self.config.host)
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.ssh_bin);
        cmd.arg("-p")
            .arg(self.config.port.to_string())
            .arg("-i")
            .arg(&self.config.private_key)
            .arg("-S")
            .arg(&self.control_path)
            .args([
                "-o",
                "StrictHostKeyChecking=no",
                "-o",
                "UserKnownHostsFile=/dev/null",
                "-o",
                "BatchMode=yes",
                "-o",
                "LogLevel=ERROR",
            ]);
        cmd
    }

    fn remote_command(&self, command: &str) -> Result<Command, ShellError> {
        if *self.closed.lock() {
            return Err(ShellError::Closed);
        }
        let mut cmd = self.base_command();
        cmd.arg(self.destination()).arg("--").arg(command);
        Ok(cmd)
    }

    /// Exit 255 is a transport failure only when the master is gone too;
    /// otherwise it is the remote command's own status.
    async fn check_transport(&self, output: CommandOutput) -> Result<CommandOutput, ShellError> {
        if output.exit_code != SSH_TRANSPORT_FAILURE || self.master_alive().await {
            return Ok(output);
        }
        Err(ShellError::Connection(format!("{}: {}", self.config.host, output.stderr.trim())))
    }

    async fn master_alive(&self) -> bool {
        let mut cmd = self.base_command();
        cmd.args(["-O", "check"]).arg(self.destination());
        matches!(subprocess::capture(cmd).await, Ok(output) if output.success())
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        let output = subprocess::capture(self.remote_command(command)?).await?;
        self.check_transport(output).await
    }

    async fn run_with_stdout(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<CommandOutput, ShellError> {
        let output = subprocess::stream_stdout(self.remote_command(command)?, sink).await?;
        self.check_transport(output).await
    }

    async fn run_with_stdin(
        &self,
        command: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<CommandOutput, ShellError> {
        let output = subprocess::stream_stdin(self.remote_command(command)?, source).await?;
        self.check_transport(output).await
    }

    fn username(&self) -> &str {
        &self.config.username
    }

    async fn close(&self) -> Result<(), ShellError> {
        {
            let mut closed = self.closed.lock();
            if *closed {
                return Err(ShellError::Closed);
            }
            *closed = true;
        }
        let mut cmd = self.base_command();
        cmd.args(["-O", "exit"]).arg(self.destination());
        tracing::debug!(host = %self.config.host, "closing ssh session");
        let output = subprocess::capture(cmd).await?;
        if !output.success() {
            return Err(ShellError::Connection(format!(
                "failed to close session to {}: {}",
                self.config.host,
                output.stderr.trim()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
