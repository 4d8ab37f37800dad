// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote runner: the command vocabulary the orchestrator uses on an instance.

use crate::shell::{CommandOutput, RemoteShell, ShellError};
use bbr_core::{InstanceKey, Script};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};

/// Errors from remote operations
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{command} failed on {instance} with exit code {exit_code}: {}", .stderr.trim())]
    CommandFailed {
        instance: InstanceKey,
        command: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    #[error("remote shell error on {instance}: {source}")]
    Shell {
        instance: InstanceKey,
        #[source]
        source: ShellError,
    },
    #[error("unexpected checksum output on {instance}: {line}")]
    ChecksumOutput { instance: InstanceKey, line: String },
}

impl RemoteError {
    /// Exit code of the remote command, when it ran.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RemoteError::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }

    pub fn instance(&self) -> &InstanceKey {
        match self {
            RemoteError::CommandFailed { instance, .. }
            | RemoteError::Shell { instance, .. }
            | RemoteError::ChecksumOutput { instance, .. } => instance,
        }
    }

    /// Captured `(stdout, stderr)` of a command that exited non-zero.
    pub fn output(&self) -> Option<(&str, &str)> {
        match self {
            RemoteError::CommandFailed { stdout, stderr, .. } => Some((stdout, stderr)),
            _ => None,
        }
    }
}

/// Executes commands on one instance over its [`RemoteShell`].
#[derive(Clone)]
pub struct RemoteRunner {
    instance: InstanceKey,
    shell: Arc<dyn RemoteShell>,
}

impl RemoteRunner {
    pub fn new(instance: InstanceKey, shell: Arc<dyn RemoteShell>) -> Self {
        Self { instance, shell }
    }

    pub fn instance(&self) -> &InstanceKey {
        &self.instance
    }

    fn sudo(&self) -> &str {
        self.shell.sudo()
    }

    fn shell_error(&self, source: ShellError) -> RemoteError {
        RemoteError::Shell { instance: self.instance.clone(), source }
    }

    fn check(&self, command: &str, output: CommandOutput) -> Result<CommandOutput, RemoteError> {
        if output.success() {
            return Ok(output);
        }
        Err(RemoteError::CommandFailed {
            instance: self.instance.clone(),
            command: command.to_string(),
            exit_code: output.exit_code,
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    /// Run a command as-is. A non-zero exit is not an error here.
    pub async fn run(&self, command: &str) -> Result<CommandOutput, RemoteError> {
        tracing::debug!(instance = %self.instance, command, "running remote command");
        let output = self.shell.run(command).await.map_err(|e| self.shell_error(e))?;
        if !output.stdout.is_empty() {
            let stdout = output.stdout.trim_end();
            tracing::debug!(instance = %self.instance, %stdout, "stdout");
        }
        if !output.stderr.is_empty() {
            let stderr = output.stderr.trim_end();
            tracing::debug!(instance = %self.instance, %stderr, "stderr");
        }
        Ok(output)
    }

    /// Run a command, converting a non-zero exit into [`RemoteError::CommandFailed`].
    pub async fn run_checked(&self, command: &str) -> Result<String, RemoteError> {
        let output = self.run(command).await?;
        Ok(self.check(command, output)?.stdout)
    }

    /// Execute a discovered script with elevated privileges.
    pub async fn run_script(&self, script: &Script) -> Result<String, RemoteError> {
        let command = format!("{}{}", self.sudo(), script.path());
        self.run_checked(&command).await
    }

    fn env_script_command(&self, script: &Script, artifact_dir: &str) -> String {
        format!(
            "{sudo}env BBR_ARTIFACT_DIRECTORY={dir}/ ARTIFACT_DIRECTORY={dir}/ {script}",
            sudo = self.sudo(),
            dir = artifact_dir,
            script = script.path()
        )
    }

    /// Execute a script with both artifact directory variables pointing at
    /// `artifact_dir/`.
    pub async fn run_script_with_env(
        &self,
        script: &Script,
        artifact_dir: &str,
    ) -> Result<String, RemoteError> {
        let command = self.env_script_command(script, artifact_dir);
        self.run_checked(&command).await
    }

    /// Create `artifact_dir` and run a backup script against it in one
    /// remote invocation.
    pub async fn run_backup_script(
        &self,
        script: &Script,
        artifact_dir: &str,
    ) -> Result<String, RemoteError> {
        let command = format!(
            "{}mkdir -p {} && {}",
            self.sudo(),
            artifact_dir,
            self.env_script_command(script, artifact_dir)
        );
        self.run_checked(&command).await
    }

    /// Stream a tar of the directory's contents into `sink`.
    pub async fn compress_directory(
        &self,
        path: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<(), RemoteError> {
        let command = format!("{}tar -C {} -c .", self.sudo(), path);
        tracing::debug!(instance = %self.instance, command, "streaming from remote");
        let output =
            self.shell.run_with_stdout(&command, sink).await.map_err(|e| self.shell_error(e))?;
        self.check(&command, output)?;
        Ok(())
    }

    /// Extract a tar read from `source` into an existing directory.
    pub async fn extract_archive(
        &self,
        source: &mut (dyn AsyncRead + Send + Unpin),
        path: &str,
    ) -> Result<(), RemoteError> {
        let command = format!("{}tar -C {} -x", self.sudo(), path);
        tracing::debug!(instance = %self.instance, command, "streaming to remote");
        let output =
            self.shell.run_with_stdin(&command, source).await.map_err(|e| self.shell_error(e))?;
        self.check(&command, output)?;
        Ok(())
    }

    pub async fn create_directory(&self, path: &str) -> Result<(), RemoteError> {
        self.run_checked(&format!("{}mkdir -p {}", self.sudo(), path)).await.map(drop)
    }

    pub async fn remove_directory(&self, path: &str) -> Result<(), RemoteError> {
        self.run_checked(&format!("{}rm -rf {}", self.sudo(), path)).await.map(drop)
    }

    pub async fn directory_exists(&self, path: &str) -> Result<bool, RemoteError> {
        let command = format!("{}test -d {}", self.sudo(), path);
        let output = self.run(&command).await?;
        match output.exit_code {
            0 => Ok(true),
            1 => Ok(false),
            exit_code => Err(RemoteError::CommandFailed {
                instance: self.instance.clone(),
                command,
                exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            }),
        }
    }

    /// Human readable size, as reported by `du -sh`.
    pub async fn size_of(&self, path: &str) -> Result<String, RemoteError> {
        let command = format!("{}du -sh {} | cut -f1", self.sudo(), path);
        let stdout = self.run_checked(&command).await?;
        Ok(stdout.trim().to_string())
    }

    /// SHA-256 of every file under `path`, keyed by path relative to it.
    pub async fn checksum_directory(
        &self,
        path: &str,
    ) -> Result<BTreeMap<String, String>, RemoteError> {
        let command = format!(
            "{}sh -c 'cd {} && find . -type f -print0 | xargs -0 sha256sum'",
            self.sudo(),
            path
        );
        let stdout = self.run_checked(&command).await?;
        let mut checksums = BTreeMap::new();
        for line in stdout.lines().filter(|l| !l.trim().is_empty()) {
            let (sum, file) = line.split_once("  ").ok_or_else(|| RemoteError::ChecksumOutput {
                instance: self.instance.clone(),
                line: line.to_string(),
            })?;
            // xargs runs sha256sum on stdin when there are no files
            if file == "-" {
                continue;
            }
            let file = file.strip_prefix("./").unwrap_or(file);
            checksums.insert(file.to_string(), sum.to_string());
        }
        Ok(checksums)
    }

    /// Resolve a glob to regular files. A glob matching nothing is empty, not an error.
    pub async fn find_files(&self, glob: &str) -> Result<Vec<String>, RemoteError> {
        let command = format!("{}sh -c 'find {} -type f'", self.sudo(), glob);
        let output = self.run(&command).await?;
        let output = if output.stderr.contains("No such file or directory") {
            output
        } else {
            self.check(&command, output)?
        };
        Ok(output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    pub fn connected_username(&self) -> &str {
        self.shell.username()
    }

    /// Close the session. Only instance cleanup calls this.
    pub async fn teardown(&self) -> Result<(), RemoteError> {
        tracing::debug!(
            instance = %self.instance,
            username = self.connected_username(),
            "closing remote session"
        );
        self.shell.close().await.map_err(|e| self.shell_error(e))
    }
}

#[cfg(test)]
#[path = "remote_tests.rs"]
mod tests;
