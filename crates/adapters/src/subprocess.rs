// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Child process plumbing shared by the process-backed shells.

use crate::shell::{CommandOutput, ShellError};
use std::process::{ExitStatus, Stdio};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};

fn program(cmd: &Command) -> String {
    cmd.as_std().get_program().to_string_lossy().into_owned()
}

fn spawn(mut cmd: Command, stdin: Stdio) -> Result<Child, ShellError> {
    cmd.stdin(stdin).stdout(Stdio::piped()).stderr(Stdio::piped()).kill_on_drop(true);
    cmd.spawn().map_err(|source| ShellError::Spawn { program: program(&cmd), source })
}

fn exit_code(status: ExitStatus) -> i32 {
    // Killed by a signal
    status.code().unwrap_or(-1)
}

async fn read_all(pipe: Option<impl AsyncRead + Unpin>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Run to completion, capturing stdout and stderr.
pub async fn capture(cmd: Command) -> Result<CommandOutput, ShellError> {
    let child = spawn(cmd, Stdio::null())?;
    let output = child.wait_with_output().await?;
    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: exit_code(output.status),
    })
}

/// Run to completion with stdout copied into `sink`.
pub async fn stream_stdout(
    cmd: Command,
    sink: &mut (dyn AsyncWrite + Send + Unpin),
) -> Result<CommandOutput, ShellError> {
    let mut child = spawn(cmd, Stdio::null())?;
    let mut stdout = child.stdout.take().ok_or(ShellError::Closed)?;
    let stderr = child.stderr.take();

    let (copied, stderr) = tokio::join!(tokio::io::copy(&mut stdout, sink), read_all(stderr));
    copied?;
    sink.flush().await?;
    let status = child.wait().await?;
    Ok(CommandOutput {
        stdout: String::new(),
        stderr: String::from_utf8_lossy(&stderr?).into_owned(),
        exit_code: exit_code(status),
    })
}

/// Run to completion with `source` copied into stdin.
///
/// A write failure is only reported when the command itself succeeded;
/// a command that exits early closes its stdin and its exit code is the
/// more useful error.
pub async fn stream_stdin(
    cmd: Command,
    source: &mut (dyn AsyncRead + Send + Unpin),
) -> Result<CommandOutput, ShellError> {
    let mut child = spawn(cmd, Stdio::piped())?;
    let mut stdin = child.stdin.take().ok_or(ShellError::Closed)?;
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let feed = async move {
        tokio::io::copy(source, &mut stdin).await?;
        stdin.shutdown().await
    };
    let (fed, stdout, stderr) = tokio::join!(feed, read_all(stdout), read_all(stderr));
    let status = child.wait().await?;
    let output = CommandOutput {
        stdout: String::from_utf8_lossy(&stdout?).into_owned(),
        stderr: String::from_utf8_lossy(&stderr?).into_owned(),
        exit_code: exit_code(status),
    };
    if output.success() {
        fed?;
    }
    Ok(output)
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
