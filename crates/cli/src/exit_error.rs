// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Non-zero exit of a command that already reported its own failures.

use std::fmt;

/// `main` exits with `code`, printing `summary` first when there is one.
/// Per-deployment output has already gone to stdout and stderr.
#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub summary: Option<String>,
}

impl ExitError {
    pub fn code(code: i32) -> Self {
        Self { code, summary: None }
    }

    pub fn with_summary(self, summary: impl Into<String>) -> Self {
        Self { summary: Some(summary.into()), ..self }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.summary {
            Some(summary) => f.write_str(summary),
            None => write!(f, "exited with code {}", self.code),
        }
    }
}

impl std::error::Error for ExitError {}
