// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle scripts discovered under a job's `bin/bbr` directory.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Glob used to enumerate candidate scripts on an instance.
pub const SCRIPT_GLOB: &str = "/var/vcap/jobs/*/bin/bbr/*";

/// `/var/vcap/jobs/<JOB>/bin/bbr/<KIND>`
#[allow(clippy::expect_used)]
static SCRIPT_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^/var/vcap/jobs/([^/]+)/bin/bbr/([^/]+)$")
        .expect("constant regex pattern is valid")
});

/// The lifecycle hook a script implements, taken from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptKind {
    Backup,
    Restore,
    PreBackupLock,
    PostBackupUnlock,
    Metadata,
}

impl ScriptKind {
    pub const ALL: [ScriptKind; 5] = [
        ScriptKind::Backup,
        ScriptKind::Restore,
        ScriptKind::PreBackupLock,
        ScriptKind::PostBackupUnlock,
        ScriptKind::Metadata,
    ];

    /// Map a script file name to its kind. Unknown names yield `None`.
    pub fn from_file_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

crate::simple_display! {
    ScriptKind {
        Backup => "backup",
        Restore => "restore",
        PreBackupLock => "pre-backup-lock",
        PostBackupUnlock => "post-backup-unlock",
        Metadata => "metadata",
    }
}

/// A recognised script path on an instance.
///
/// Paths that do not follow the `/var/vcap/jobs/<JOB>/bin/bbr/<KIND>`
/// layout, or whose `<KIND>` is not a known hook, never become a `Script`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Script {
    path: String,
    job_name: String,
    kind: ScriptKind,
}

impl Script {
    /// Parse a discovered path, ignoring anything that is not a hook script.
    pub fn parse(path: &str) -> Option<Self> {
        let caps = SCRIPT_PATH.captures(path.trim())?;
        let kind = ScriptKind::from_file_name(&caps[2])?;
        Some(Self { path: caps[0].to_string(), job_name: caps[1].to_string(), kind })
    }

    /// Build the canonical script path for a job and kind.
    pub fn for_job(job_name: &str, kind: ScriptKind) -> Self {
        Self {
            path: format!("/var/vcap/jobs/{}/bin/bbr/{}", job_name, kind.name()),
            job_name: job_name.to_string(),
            kind,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// `<JOB>` component of the path.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    /// `<KIND>` component of the path.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn kind(&self) -> ScriptKind {
        self.kind
    }
}

impl std::fmt::Display for Script {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
#[path = "script_tests.rs"]
mod tests;
