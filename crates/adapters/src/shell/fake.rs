// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scripted shell for tests.

use super::{CommandOutput, RemoteShell, ShellError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Ordered log of commands shared by several fake shells, each entry
/// prefixed with the shell's label.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }

    /// Position of the first entry containing `needle`.
    pub fn position(&self, needle: &str) -> Option<usize> {
        self.entries.lock().iter().position(|e| e.contains(needle))
    }

    fn push(&self, entry: String) {
        self.entries.lock().push(entry);
    }
}

#[derive(Clone)]
enum Reply {
    Output(CommandOutput),
    TransportError(String),
}

struct Rule {
    pattern: String,
    reply: Reply,
    stream: Option<Vec<u8>>,
}

#[derive(Default)]
struct FakeShellState {
    rules: Vec<Rule>,
    calls: Vec<String>,
    received: Vec<(String, Vec<u8>)>,
    closed: u32,
}

/// Fake remote shell: answers commands from registered rules and records
/// every call. The most recently registered matching rule wins; unmatched
/// commands succeed with empty output.
#[derive(Clone)]
pub struct FakeShell {
    label: String,
    username: String,
    inner: Arc<Mutex<FakeShellState>>,
    journal: Option<Journal>,
}

impl Default for FakeShell {
    fn default() -> Self {
        Self::new("fake")
    }
}

impl FakeShell {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            username: "bbr-user".to_string(),
            inner: Arc::new(Mutex::new(FakeShellState::default())),
            journal: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Also record calls into a journal shared with other shells.
    pub fn with_journal(mut self, journal: &Journal) -> Self {
        self.journal = Some(journal.clone());
        self
    }

    /// Reply to commands containing `pattern`.
    pub fn on(&self, pattern: &str, stdout: &str, stderr: &str, exit_code: i32) -> &Self {
        self.push_rule(
            pattern,
            Reply::Output(CommandOutput {
                stdout: stdout.to_string(),
                stderr: stderr.to_string(),
                exit_code,
            }),
            None,
        )
    }

    /// Succeed with `stdout` for commands containing `pattern`.
    pub fn on_ok(&self, pattern: &str, stdout: &str) -> &Self {
        self.on(pattern, stdout, "", 0)
    }

    /// Fail with `exit_code` for commands containing `pattern`.
    pub fn on_fail(&self, pattern: &str, stderr: &str, exit_code: i32) -> &Self {
        self.on(pattern, "", stderr, exit_code)
    }

    /// Fail at the transport level for commands containing `pattern`.
    pub fn on_transport_error(&self, pattern: &str, message: &str) -> &Self {
        self.push_rule(pattern, Reply::TransportError(message.to_string()), None)
    }

    /// Stream `bytes` as stdout for streaming commands containing `pattern`.
    pub fn on_stream(&self, pattern: &str, bytes: Vec<u8>) -> &Self {
        self.push_rule(pattern, Reply::Output(CommandOutput::default()), Some(bytes))
    }

    fn push_rule(&self, pattern: &str, reply: Reply, stream: Option<Vec<u8>>) -> &Self {
        self.inner.lock().rules.push(Rule { pattern: pattern.to_string(), reply, stream });
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().calls.clone()
    }

    /// Commands containing `needle`.
    pub fn calls_matching(&self, needle: &str) -> Vec<String> {
        self.calls().into_iter().filter(|c| c.contains(needle)).collect()
    }

    /// Bytes received on stdin, per command.
    pub fn received(&self) -> Vec<(String, Vec<u8>)> {
        self.inner.lock().received.clone()
    }

    pub fn close_count(&self) -> u32 {
        self.inner.lock().closed
    }

    fn answer(&self, command: &str) -> (Reply, Option<Vec<u8>>) {
        if let Some(journal) = &self.journal {
            journal.push(format!("{} {}", self.label, command));
        }
        let mut state = self.inner.lock();
        state.calls.push(command.to_string());
        state
            .rules
            .iter()
            .rev()
            .find(|rule| command.contains(&rule.pattern))
            .map(|rule| (rule.reply.clone(), rule.stream.clone()))
            .unwrap_or((Reply::Output(CommandOutput::default()), None))
    }

    fn finish(reply: Reply) -> Result<CommandOutput, ShellError> {
        match reply {
            Reply::Output(output) => Ok(output),
            Reply::TransportError(message) => Err(ShellError::Connection(message)),
        }
    }
}

#[async_trait]
impl RemoteShell for FakeShell {
    async fn run(&self, command: &str) -> Result<CommandOutput, ShellError> {
        let (reply, _) = self.answer(command);
        Self::finish(reply)
    }

    async fn run_with_stdout(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<CommandOutput, ShellError> {
        let (reply, stream) = self.answer(command);
        if let Some(bytes) = stream {
            sink.write_all(&bytes).await?;
            sink.flush().await?;
        }
        Self::finish(reply)
    }

    async fn run_with_stdin(
        &self,
        command: &str,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<CommandOutput, ShellError> {
        let (reply, _) = self.answer(command);
        let mut bytes = Vec::new();
        source.read_to_end(&mut bytes).await?;
        self.inner.lock().received.push((command.to_string(), bytes));
        Self::finish(reply)
    }

    fn username(&self) -> &str {
        &self.username
    }

    async fn close(&self) -> Result<(), ShellError> {
        if let Some(journal) = &self.journal {
            journal.push(format!("{} <close>", self.label));
        }
        self.inner.lock().closed += 1;
        Ok(())
    }
}
