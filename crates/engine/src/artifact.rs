// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Remote side of one job's artifact.

use crate::error::Error;
use bbr_adapters::{RemoteError, RemoteRunner};
use bbr_core::{artifact_stem, remote_artifact_dir, ArtifactKind, InstanceKey, Job};
use bbr_storage::{Checksums, StoredArtifact};
use tokio::io::{AsyncRead, AsyncWrite};

/// The directory a job reads or writes under
/// `/var/vcap/store/bbr-backup/<name>` on its instance.
pub struct Artifact {
    runner: RemoteRunner,
    name: String,
    custom: bool,
    kind: ArtifactKind,
}

impl Artifact {
    pub fn for_backup(runner: RemoteRunner, job: &Job) -> Self {
        Self {
            runner,
            name: job.backup_artifact_name().to_string(),
            custom: job.has_backup_artifact_name(),
            kind: ArtifactKind::Backup,
        }
    }

    pub fn for_restore(runner: RemoteRunner, job: &Job) -> Self {
        Self {
            runner,
            name: job.restore_artifact_name().to_string(),
            custom: job.has_restore_artifact_name(),
            kind: ArtifactKind::Restore,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_custom_name(&self) -> bool {
        self.custom
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    pub fn instance(&self) -> &InstanceKey {
        self.runner.instance()
    }

    pub fn instance_name(&self) -> &str {
        &self.instance().group
    }

    pub fn instance_index(&self) -> u32 {
        self.instance().index
    }

    /// Local payload file name without extension.
    pub fn stem(&self) -> String {
        artifact_stem(self.instance(), &self.name)
    }

    pub fn remote_dir(&self) -> String {
        remote_artifact_dir(&self.name)
    }

    pub async fn stream_from_remote(
        &self,
        sink: &mut (dyn AsyncWrite + Send + Unpin),
    ) -> Result<(), RemoteError> {
        self.runner.compress_directory(&self.remote_dir(), sink).await
    }

    pub async fn stream_to_remote(
        &self,
        source: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<(), RemoteError> {
        let dir = self.remote_dir();
        self.runner.create_directory(&dir).await?;
        self.runner.extract_archive(source, &dir).await
    }

    pub async fn size(&self) -> Result<String, RemoteError> {
        self.runner.size_of(&self.remote_dir()).await
    }

    pub async fn checksum(&self) -> Result<Checksums, RemoteError> {
        self.runner.checksum_directory(&self.remote_dir()).await
    }

    pub async fn delete(&self) -> Result<(), RemoteError> {
        self.runner.remove_directory(&self.remote_dir()).await
    }
}

/// Files whose checksums differ between two indexes, including files
/// present on only one side.
pub fn mismatched_files(expected: &Checksums, actual: &Checksums) -> Vec<String> {
    let mut files: Vec<String> = expected
        .iter()
        .filter(|(file, sum)| actual.get(*file) != Some(*sum))
        .map(|(file, _)| file.clone())
        .chain(actual.keys().filter(|file| !expected.contains_key(*file)).cloned())
        .collect();
    files.sort();
    files
}

/// Pick the recorded artifact a restore job on `instance` consumes.
///
/// - custom `restore_name`: the same instance's custom artifact, else the
///   only recorded custom artifact with that name
/// - backup-one-restore-all: the job's artifact from any instance of the group
/// - otherwise: the job's artifact from the same instance
pub fn resolve_restore_artifact<'a>(
    recorded: &'a [StoredArtifact],
    instance: &InstanceKey,
    job: &Job,
) -> Result<&'a StoredArtifact, Error> {
    let name = job.restore_artifact_name();
    let missing =
        || Error::MissingArtifact { instance: instance.clone(), artifact: name.to_string() };

    if job.has_restore_artifact_name() {
        let candidates: Vec<&StoredArtifact> =
            recorded.iter().filter(|a| a.custom && a.name == name).collect();
        if let Some(own) = candidates.iter().find(|a| a.belongs_to(instance)) {
            return Ok(*own);
        }
        return match candidates.as_slice() {
            [] => Err(missing()),
            [only] => Ok(*only),
            _ => Err(Error::AmbiguousArtifact { artifact: name.to_string() }),
        };
    }

    let same_job = |a: &&StoredArtifact| !a.custom && a.name == name;
    if job.backup_one_restore_all() {
        return recorded
            .iter()
            .filter(same_job)
            .find(|a| a.instance_name == instance.group)
            .ok_or_else(missing);
    }
    recorded.iter().filter(same_job).find(|a| a.belongs_to(instance)).ok_or_else(missing)
}

#[cfg(test)]
#[path = "artifact_tests.rs"]
mod tests;
