// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A job's hook scripts and metadata as discovered on one instance.

use crate::metadata::{LockBefore, Metadata};
use crate::script::{Script, ScriptKind};
use serde::{Deserialize, Serialize};

/// Lock-graph node: a job is identified deployment-wide by its release and name.
///
/// Field order gives the `(release, job_name)` lexicographic ordering used to
/// break ties between independent jobs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobIdentity {
    pub release: String,
    pub name: String,
}

impl JobIdentity {
    pub fn new(release: impl Into<String>, name: impl Into<String>) -> Self {
        Self { release: release.into(), name: name.into() }
    }
}

impl From<&LockBefore> for JobIdentity {
    fn from(lb: &LockBefore) -> Self {
        Self { release: lb.release.clone(), name: lb.job_name.clone() }
    }
}

impl std::fmt::Display for JobIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.release, self.name)
    }
}

/// A job on one instance. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    name: String,
    release: String,
    backup: Option<Script>,
    restore: Option<Script>,
    pre_backup_lock: Option<Script>,
    post_backup_unlock: Option<Script>,
    metadata: Metadata,
    backup_one_restore_all: bool,
}

impl Job {
    /// Build a job from the scripts found under its directory.
    ///
    /// `metadata` scripts and scripts belonging to other jobs are ignored.
    pub fn new(
        name: impl Into<String>,
        release: impl Into<String>,
        scripts: &[Script],
        metadata: Metadata,
        backup_one_restore_all: bool,
    ) -> Self {
        let name = name.into();
        let find = |kind: ScriptKind| {
            scripts.iter().find(|s| s.kind() == kind && s.job_name() == name).cloned()
        };
        Self {
            backup: find(ScriptKind::Backup),
            restore: find(ScriptKind::Restore),
            pre_backup_lock: find(ScriptKind::PreBackupLock),
            post_backup_unlock: find(ScriptKind::PostBackupUnlock),
            release: release.into(),
            metadata,
            backup_one_restore_all,
            name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn identity(&self) -> JobIdentity {
        JobIdentity::new(&self.release, &self.name)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Skipped jobs stay known to the deployment but never run a script.
    pub fn is_skipped(&self) -> bool {
        self.metadata.skip_bbr_scripts
    }

    fn active<'a>(&self, script: &'a Option<Script>) -> Option<&'a Script> {
        if self.is_skipped() {
            None
        } else {
            script.as_ref()
        }
    }

    pub fn backup_script(&self) -> Option<&Script> {
        self.active(&self.backup)
    }

    pub fn restore_script(&self) -> Option<&Script> {
        self.active(&self.restore)
    }

    pub fn pre_backup_lock_script(&self) -> Option<&Script> {
        self.active(&self.pre_backup_lock)
    }

    pub fn post_backup_unlock_script(&self) -> Option<&Script> {
        self.active(&self.post_backup_unlock)
    }

    pub fn has_backup(&self) -> bool {
        self.backup_script().is_some()
    }

    pub fn has_restore(&self) -> bool {
        self.restore_script().is_some()
    }

    pub fn has_pre_backup_lock(&self) -> bool {
        self.pre_backup_lock_script().is_some()
    }

    pub fn has_post_backup_unlock(&self) -> bool {
        self.post_backup_unlock_script().is_some()
    }

    pub fn has_backup_artifact_name(&self) -> bool {
        self.metadata.backup_name.is_some()
    }

    pub fn has_restore_artifact_name(&self) -> bool {
        self.metadata.restore_name.is_some()
    }

    /// Logical backup artifact name: the custom `backup_name` or the job name.
    pub fn backup_artifact_name(&self) -> &str {
        self.metadata.backup_name.as_deref().unwrap_or(&self.name)
    }

    /// Logical restore artifact name: the custom `restore_name` or the job name.
    pub fn restore_artifact_name(&self) -> &str {
        self.metadata.restore_name.as_deref().unwrap_or(&self.name)
    }

    pub fn backup_should_be_locked_before(&self) -> &[LockBefore] {
        &self.metadata.backup_should_be_locked_before
    }

    pub fn restore_should_be_locked_before(&self) -> &[LockBefore] {
        &self.metadata.restore_should_be_locked_before
    }

    /// Backed up once per instance group, restored onto every instance.
    pub fn backup_one_restore_all(&self) -> bool {
        self.backup_one_restore_all
    }
}

crate::builder! {
    pub struct JobBuilder => Job {
        into {
            name: String = "redis",
            release: String = "redis-release",
        }
        set {
            metadata: Metadata = Metadata::default(),
            backup_one_restore_all: bool = false,
        }
        option {
            backup: Script,
            restore: Script,
            pre_backup_lock: Script,
            post_backup_unlock: Script,
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl JobBuilder {
    /// Give the job every hook script at its canonical path.
    pub fn all_scripts(self) -> Self {
        let name = self.name.clone();
        self.backup(Script::for_job(&name, ScriptKind::Backup))
            .restore(Script::for_job(&name, ScriptKind::Restore))
            .pre_backup_lock(Script::for_job(&name, ScriptKind::PreBackupLock))
            .post_backup_unlock(Script::for_job(&name, ScriptKind::PostBackupUnlock))
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
