// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local transport rooted at a sandbox directory.
//!
//! Commands run through `bash -c` on this host. Every `/var/vcap/` path in a
//! command is rebased under `root`, and rebased paths in stdout are mapped
//! back, so callers only ever see canonical instance paths. Commands are not
//! elevated.

use super::{CommandOutput, RemoteShell, ShellError};
use crate::subprocess;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::process::Command;

const VCAP: &str = "/var/vcap/";

pub struct LocalShell {
    root: PathBuf,
    username: String,
}

impl LocalShell {
    /// `username` is what the session reports as its login name.
    pub fn new(root: impl Into<PathBuf>, username: impl Into<String>) -> Self {
        Self { root: root.into(), username: username.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn rebased_vcap(&self) -> String {
        format!("{}{}", self.root.display().to_string().trim_end_matches('/'), VCAP)
    }

    fn rebase(&self, command: &str) -> String {
        command.replace(VCAP, &self.rebased_vcap())
    }

    fn unbase(&self, text: &str) -> String {
        text.replace(&self.rebased_vcap(), VCAP)
    }

    fn command(&self, command: &str) -> Command {
        let mut cmd = Command::new("bash");
        cmd.arg("-c").arg(self.rebase(command)).current_dir(&self.root);
        cmd
    }

    fn map_output(&self, output: CommandOutput) -> CommandOutput {
        CommandOutput {
            stdout: self.unbase(&output.stdout),
            stderr: self.unbase(&output.stderr),
            exit_code: output.exit_code,
        }
    }
}

#[async_trait]
impl RemoteShell for LocalShell {
    async fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        let output = subprocess::capture(self.command(command)).await?;
        Ok(self.map_output(output))
    }

    async fn run_with_stdout(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<CommandOutput, ShellError> {
        let output = subprocess::stream_stdout(self.command(command), sink).await?;
        Ok(self.map_output(output))
    }

    async fn run_with_stdin(
        &self,
        command: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<CommandOutput, ShellError> {
        let output = subprocess::stream_stdin(self.command(command), source).await?;
        Ok(self.map_output(output))
    }

    fn username(&self) -> &str {
        &self.username
    }

    fn sudo(&self) -> &str {
        ""
    }

    async fn close(&self) -> Result<(), ShellError> {
        Ok(())
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
