// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orchestration errors and the tagged error set a workflow returns.

use bbr_adapters::{DirectoryError, ManifestError, RemoteError};
use bbr_core::{InstanceKey, JobIdentity, MetadataError, ScriptKind};
use bbr_storage::StoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("{kind} script for job {job} failed: {source}")]
    Script {
        instance: InstanceKey,
        job: String,
        kind: ScriptKind,
        #[source]
        source: RemoteError,
    },
    #[error("invalid metadata for job {job} on {instance}: {source}")]
    Metadata {
        instance: InstanceKey,
        job: String,
        #[source]
        source: MetadataError,
    },
    #[error("{instance}: {source}")]
    Release {
        instance: InstanceKey,
        #[source]
        source: ManifestError,
    },
    #[error("job locking dependency graph is cyclic: {}", join(.0))]
    LockCycle(Vec<JobIdentity>),
    #[error("job {job} should be locked before {target}, which is not in the deployment")]
    MissingLockTarget { job: JobIdentity, target: JobIdentity },
    #[error("backup artifact {artifact} on {instance} has mismatched checksums: {}", .files.join(", "))]
    ChecksumMismatch { instance: InstanceKey, artifact: String, files: Vec<String> },
    #[error("backup artifact {artifact} on {instance} is empty")]
    EmptyArtifact { instance: InstanceKey, artifact: String },
    #[error("multiple jobs in deployment '{deployment}' specify the same backup name '{name}': {}", .jobs.join(", "))]
    DuplicateCustomName { deployment: String, name: String, jobs: Vec<String> },
    #[error("jobs {} on instance {instance} would back up into the same artifact '{name}'", .jobs.join(", "))]
    SharedArtifactName { instance: InstanceKey, name: String, jobs: Vec<String> },
    #[error("directory {path} already exists on instance {instance}")]
    ArtifactDirExists { instance: InstanceKey, path: String },
    #[error("deployment '{0}' has no backup scripts")]
    NotBackupable(String),
    #[error("deployment '{0}' has no restore scripts")]
    NotRestorable(String),
    #[error("backup artifact {0} is corrupted")]
    InvalidArtifact(PathBuf),
    #[error("no backup artifact '{artifact}' found for {instance}")]
    MissingArtifact { instance: InstanceKey, artifact: String },
    #[error("backup artifact '{artifact}' matches more than one recorded artifact")]
    AmbiguousArtifact { artifact: String },
    #[error("backup artifact {artifact} has no matching job in deployment '{deployment}'")]
    UnmatchedArtifact { deployment: String, artifact: String },
    #[error("cannot {event} from state {state}")]
    InvalidTransition { state: String, event: String },
    #[error("operation cancelled")]
    Cancelled,
}

fn join(nodes: &[JobIdentity]) -> String {
    nodes.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

impl Error {
    /// Tag this error carries regardless of the phase it surfaced in.
    fn intrinsic_kind(&self) -> Option<ErrorKind> {
        match self {
            Error::LockCycle(_) | Error::MissingLockTarget { .. } => {
                Some(ErrorKind::LockingDependency)
            }
            Error::ArtifactDirExists { .. } => Some(ErrorKind::ArtifactDirExists),
            _ => None,
        }
    }
}

/// Classification of a recorded error; each maps to one exit code bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    Fatal,
    PostBackupUnlock,
    Cleanup,
    LockingDependency,
    ArtifactDirExists,
}

bbr_core::simple_display! {
    ErrorKind {
        Fatal => "fatal",
        PostBackupUnlock => "post-backup-unlock",
        Cleanup => "cleanup",
        LockingDependency => "locking-dependency",
        ArtifactDirExists => "artifact-dir-exists",
    }
}

impl ErrorKind {
    pub fn exit_bit(self) -> i32 {
        match self {
            ErrorKind::Fatal => 1,
            ErrorKind::PostBackupUnlock => 2,
            ErrorKind::Cleanup => 4,
            ErrorKind::LockingDependency => 8,
            ErrorKind::ArtifactDirExists => 16,
        }
    }

    /// Kinds that stop a workflow from producing a usable result.
    pub fn is_fatal(self) -> bool {
        matches!(
            self,
            ErrorKind::Fatal | ErrorKind::LockingDependency | ErrorKind::ArtifactDirExists
        )
    }
}

/// Errors collected over a workflow, in the order they were recorded.
#[derive(Debug, Default)]
pub struct ErrorSet {
    entries: Vec<(ErrorKind, Error)>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: ErrorKind, error: Error) {
        self.entries.push((kind, error));
    }

    /// Record errors raised during a phase tagged `kind`. Errors with an
    /// intrinsic tag (lock graph, stale artifact directory) keep it.
    pub fn record(&mut self, kind: ErrorKind, errors: impl IntoIterator<Item = Error>) {
        for error in errors {
            let kind = error.intrinsic_kind().unwrap_or(kind);
            self.entries.push((kind, error));
        }
    }

    pub fn append(&mut self, other: ErrorSet) {
        self.entries.extend(other.entries);
    }

    pub fn is_nil(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_fatal(&self) -> bool {
        self.entries.iter().any(|(kind, _)| kind.is_fatal())
    }

    pub fn is_post_backup(&self) -> bool {
        self.has(ErrorKind::PostBackupUnlock)
    }

    pub fn is_cleanup(&self) -> bool {
        self.has(ErrorKind::Cleanup)
    }

    pub fn has(&self, kind: ErrorKind) -> bool {
        self.entries.iter().any(|(k, _)| *k == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ErrorKind, Error)> {
        self.entries.iter()
    }

    /// Bitwise OR of every recorded kind's exit bit.
    pub fn exit_code(&self) -> i32 {
        self.entries.iter().fold(0, |code, (kind, _)| code | kind.exit_bit())
    }
}

impl IntoIterator for ErrorSet {
    type Item = (ErrorKind, Error);
    type IntoIter = std::vec::IntoIter<(ErrorKind, Error)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
