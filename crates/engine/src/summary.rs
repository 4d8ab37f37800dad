// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Human readable failure summary printed after a workflow.

use crate::error::{Error, ErrorKind, ErrorSet};
use bbr_adapters::RemoteError;
use bbr_core::{InstanceKey, ScriptKind};
use std::fmt::Write;

/// Lines of captured output kept per stream.
const TAIL_LINES: usize = 5;

/// Everything the summary shows about one recorded error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub instance: Option<String>,
    pub job: Option<String>,
    pub phase: Option<ScriptKind>,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub message: String,
}

impl Failure {
    pub fn from_error(kind: ErrorKind, error: &Error) -> Self {
        let remote = remote_source(error);
        let (stdout, stderr) = remote.and_then(RemoteError::output).unwrap_or_default();
        let (job, phase) = match error {
            Error::Script { job, kind, .. } => (Some(job.clone()), Some(*kind)),
            Error::Metadata { job, .. } => (Some(job.clone()), Some(ScriptKind::Metadata)),
            _ => (None, None),
        };
        Self {
            kind,
            instance: instance_of(error).map(ToString::to_string),
            job,
            phase,
            exit_code: remote.and_then(RemoteError::exit_code),
            stdout: tail(stdout),
            stderr: tail(stderr),
            message: error.to_string(),
        }
    }
}

fn remote_source(error: &Error) -> Option<&RemoteError> {
    match error {
        Error::Remote(source) | Error::Script { source, .. } => Some(source),
        _ => None,
    }
}

fn instance_of(error: &Error) -> Option<&InstanceKey> {
    match error {
        Error::Remote(source) => Some(source.instance()),
        Error::Script { instance, .. }
        | Error::Metadata { instance, .. }
        | Error::Release { instance, .. }
        | Error::ChecksumMismatch { instance, .. }
        | Error::EmptyArtifact { instance, .. }
        | Error::ArtifactDirExists { instance, .. }
        | Error::SharedArtifactName { instance, .. }
        | Error::MissingArtifact { instance, .. } => Some(instance),
        _ => None,
    }
}

fn tail(output: &str) -> String {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    lines[lines.len().saturating_sub(TAIL_LINES)..].join("\n")
}

pub fn failures(errors: &ErrorSet) -> Vec<Failure> {
    errors.iter().map(|(kind, error)| Failure::from_error(*kind, error)).collect()
}

/// Render every recorded error, or an empty string when there are none.
pub fn summarize(errors: &ErrorSet) -> String {
    let failures = failures(errors);
    if failures.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    let noun = if failures.len() == 1 { "error" } else { "errors" };
    let _ = writeln!(out, "{} {noun} occurred:", failures.len());
    for (n, failure) in failures.iter().enumerate() {
        let _ = writeln!(out, "error {} ({}):", n + 1, failure.kind);
        if let Some(instance) = &failure.instance {
            let _ = writeln!(out, "  instance: {instance}");
        }
        if let Some(job) = &failure.job {
            let _ = writeln!(out, "  job: {job}");
        }
        if let Some(phase) = failure.phase {
            let _ = writeln!(out, "  phase: {phase}");
        }
        if let Some(code) = failure.exit_code {
            let _ = writeln!(out, "  exit code: {code}");
        }
        write_block(&mut out, "stdout", &failure.stdout);
        write_block(&mut out, "stderr", &failure.stderr);
        let _ = writeln!(out, "  message: {}", failure.message);
    }
    out
}

fn write_block(out: &mut String, label: &str, text: &str) {
    if text.is_empty() {
        return;
    }
    let _ = writeln!(out, "  {label}:");
    for line in text.lines() {
        let _ = writeln!(out, "    {line}");
    }
}

#[cfg(test)]
#[path = "summary_tests.rs"]
mod tests;
