// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One instance: its jobs and the per-job script phases.
//!
//! Phases never short-circuit on a failing job. Every applicable job is
//! attempted and the errors are returned together; only cancellation stops
//! a phase early, and it is checked between scripts, never mid-script.

use crate::artifact::{mismatched_files, resolve_restore_artifact, Artifact};
use crate::error::Error;
use bbr_adapters::{RemoteError, RemoteRunner};
use bbr_core::{
    remote_artifact_dir, InstanceKey, Job, JobIdentity, Script, ScriptKind, REMOTE_ARTIFACT_ROOT,
};
use bbr_storage::{LocalArtifact, StoreError, StoredArtifact};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;

pub struct Instance {
    key: InstanceKey,
    bootstrap: bool,
    runner: RemoteRunner,
    jobs: Vec<Job>,
    artifact_dir_created: bool,
}

impl Instance {
    pub fn new(runner: RemoteRunner, jobs: Vec<Job>, bootstrap: bool) -> Self {
        Self {
            key: runner.instance().clone(),
            bootstrap,
            runner,
            jobs,
            artifact_dir_created: false,
        }
    }

    pub fn key(&self) -> &InstanceKey {
        &self.key
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn is_bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub(crate) fn set_bootstrap(&mut self, bootstrap: bool) {
        self.bootstrap = bootstrap;
    }

    pub fn artifact_dir_created(&self) -> bool {
        self.artifact_dir_created
    }

    /// Jobs whose backup script runs here. Backup-one-restore-all jobs only
    /// back up on their group's bootstrap instance.
    pub fn backup_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs
            .iter()
            .filter(|job| job.has_backup() && (self.bootstrap || !job.backup_one_restore_all()))
    }

    pub fn restore_jobs(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter().filter(|job| job.has_restore())
    }

    pub fn is_backupable(&self) -> bool {
        self.backup_jobs().next().is_some()
    }

    pub fn is_restorable(&self) -> bool {
        self.restore_jobs().next().is_some()
    }

    fn script_error(&self, job: &Job, kind: ScriptKind, source: RemoteError) -> Error {
        Error::Script { instance: self.key.clone(), job: job.name().to_string(), kind, source }
    }

    async fn run_hook(&self, job: &Job, script: &Script) -> Result<(), Error> {
        tracing::info!(instance = %self.key, job = job.name(), script = script.name(), "running");
        self.runner
            .run_script(script)
            .await
            .map(drop)
            .map_err(|e| self.script_error(job, script.kind(), e))
    }

    /// Run the pre-backup-lock script of every job here with `identity`.
    pub async fn pre_backup_lock(&self, identity: &JobIdentity) -> Vec<Error> {
        let mut errors = Vec::new();
        for job in self.jobs.iter().filter(|j| j.identity() == *identity) {
            if let Some(script) = job.pre_backup_lock_script() {
                if let Err(e) = self.run_hook(job, script).await {
                    errors.push(e);
                }
            }
        }
        errors
    }

    /// Run the post-backup-unlock script of every job here with `identity`.
    pub async fn post_backup_unlock(&self, identity: &JobIdentity) -> Vec<Error> {
        let mut errors = Vec::new();
        for job in self.jobs.iter().filter(|j| j.identity() == *identity) {
            if let Some(script) = job.post_backup_unlock_script() {
                if let Err(e) = self.run_hook(job, script).await {
                    errors.push(e);
                }
            }
        }
        errors
    }

    /// Run every backup script, each into its own artifact directory.
    pub async fn backup(&mut self, cancel: &CancellationToken) -> Vec<Error> {
        let mut errors = Vec::new();
        let jobs: Vec<Job> = self.backup_jobs().cloned().collect();
        for job in &jobs {
            if cancel.is_cancelled() {
                errors.push(Error::Cancelled);
                break;
            }
            let Some(script) = job.backup_script() else { continue };
            let dir = remote_artifact_dir(job.backup_artifact_name());
            tracing::info!(instance = %self.key, job = job.name(), artifact = %dir, "backing up");
            self.artifact_dir_created = true;
            if let Err(e) = self.runner.run_backup_script(script, &dir).await {
                errors.push(self.script_error(job, ScriptKind::Backup, e));
            }
        }
        errors
    }

    /// Run the restore script of every job here with `identity`.
    pub async fn restore(&self, identity: &JobIdentity, cancel: &CancellationToken) -> Vec<Error> {
        let mut errors = Vec::new();
        for job in self.restore_jobs().filter(|j| j.identity() == *identity) {
            if cancel.is_cancelled() {
                errors.push(Error::Cancelled);
                break;
            }
            let Some(script) = job.restore_script() else { continue };
            let dir = remote_artifact_dir(job.restore_artifact_name());
            tracing::info!(instance = %self.key, job = job.name(), artifact = %dir, "restoring");
            if let Err(e) = self.runner.run_script_with_env(script, &dir).await {
                errors.push(self.script_error(job, ScriptKind::Restore, e));
            }
        }
        errors
    }

    /// Fails when a previous run left the artifact root behind.
    pub async fn check_artifact_dir(&self) -> Result<(), Error> {
        if self.runner.directory_exists(REMOTE_ARTIFACT_ROOT).await? {
            return Err(Error::ArtifactDirExists {
                instance: self.key.clone(),
                path: REMOTE_ARTIFACT_ROOT.to_string(),
            });
        }
        Ok(())
    }

    pub fn backup_artifacts(&self) -> Vec<Artifact> {
        self.backup_jobs().map(|job| Artifact::for_backup(self.runner.clone(), job)).collect()
    }

    /// Stream each backup artifact into `store`, verify it and record its
    /// checksums.
    pub async fn drain_to(&self, store: &LocalArtifact, cancel: &CancellationToken) -> Vec<Error> {
        let mut errors = Vec::new();
        for artifact in self.backup_artifacts() {
            if cancel.is_cancelled() {
                errors.push(Error::Cancelled);
                break;
            }
            if let Err(e) = self.drain_artifact(&artifact, store).await {
                errors.push(e);
            }
        }
        errors
    }

    async fn drain_artifact(
        &self,
        artifact: &Artifact,
        store: &LocalArtifact,
    ) -> Result<(), Error> {
        let stem = artifact.stem();
        match artifact.size().await {
            Ok(size) => {
                tracing::info!(instance = %self.key, artifact = %stem, %size, "copying backup")
            }
            Err(e) => {
                tracing::warn!(instance = %self.key, artifact = %stem, error = %e, "cannot size")
            }
        }

        let mut file = store.create_file(&stem).await?;
        artifact.stream_from_remote(&mut file).await?;
        let local_io =
            |source: std::io::Error| StoreError::Io { path: store.path().join(&stem), source };
        file.flush().await.map_err(local_io)?;
        file.sync_all().await.map_err(local_io)?;
        drop(file);

        let remote = artifact.checksum().await?;
        if remote.is_empty() {
            return Err(Error::EmptyArtifact { instance: self.key.clone(), artifact: stem });
        }
        let local = store.checksum(&stem).await?;
        let mismatched = mismatched_files(&remote, &local);
        if !mismatched.is_empty() {
            return Err(Error::ChecksumMismatch {
                instance: self.key.clone(),
                artifact: stem,
                files: mismatched,
            });
        }

        store.add_checksum(&self.key, artifact.name(), artifact.has_custom_name(), local);
        tracing::info!(instance = %self.key, artifact = %stem, "backup verified");

        if let Err(e) = artifact.delete().await {
            tracing::warn!(
                instance = %self.key,
                artifact = %stem,
                error = %e,
                "failed to remove remote artifact"
            );
        }
        Ok(())
    }

    /// Stream each restore job's recorded artifact from `store` onto this
    /// instance and verify it arrived intact.
    pub async fn upload_from(
        &mut self,
        store: &LocalArtifact,
        cancel: &CancellationToken,
    ) -> Vec<Error> {
        let recorded = store.artifacts();
        let mut errors = Vec::new();
        let jobs: Vec<Job> = self.restore_jobs().cloned().collect();
        for job in &jobs {
            if cancel.is_cancelled() {
                errors.push(Error::Cancelled);
                break;
            }
            let stored = match resolve_restore_artifact(&recorded, &self.key, job) {
                Ok(stored) => stored,
                Err(e) => {
                    errors.push(e);
                    continue;
                }
            };
            let artifact = Artifact::for_restore(self.runner.clone(), job);
            self.artifact_dir_created = true;
            if let Err(e) = self.upload_artifact(&artifact, store, stored).await {
                errors.push(e);
            }
        }
        errors
    }

    async fn upload_artifact(
        &self,
        artifact: &Artifact,
        store: &LocalArtifact,
        stored: &StoredArtifact,
    ) -> Result<(), Error> {
        let stem = stored.stem();
        tracing::info!(
            instance = %self.key,
            artifact = %stem,
            remote = %artifact.remote_dir(),
            "copying backup to instance"
        );
        let mut reader = store.open_file(&stem).await?;
        artifact.stream_to_remote(&mut reader).await?;

        let remote = artifact.checksum().await?;
        let mismatched = mismatched_files(&stored.checksums, &remote);
        if !mismatched.is_empty() {
            return Err(Error::ChecksumMismatch {
                instance: self.key.clone(),
                artifact: stem,
                files: mismatched,
            });
        }
        Ok(())
    }

    /// Remove the artifact root if this run created it, then close the session.
    pub async fn cleanup(&mut self) -> Vec<Error> {
        let mut errors = Vec::new();
        if self.artifact_dir_created {
            if let Err(e) = self.runner.remove_directory(REMOTE_ARTIFACT_ROOT).await {
                errors.push(e.into());
            }
        }
        if let Err(e) = self.runner.teardown().await {
            errors.push(e.into());
        }
        errors
    }

    /// Remove the artifact root unconditionally, then close the session.
    pub async fn cleanup_previous(&mut self) -> Vec<Error> {
        self.artifact_dir_created = true;
        self.cleanup().await
    }
}

#[cfg(test)]
#[path = "instance_tests.rs"]
mod tests;
