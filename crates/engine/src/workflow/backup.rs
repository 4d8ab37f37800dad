// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup workflow.
//!
//! ```text
//! ready -> is-backupable -> artifact-created -> locked -> backed-up
//!       -> unlocked -> drained -> finished
//! ```
//!
//! Cleanup is the only way to `finished`. Once locks may be held the
//! workflow always passes through `unlocked` first.

use super::fsm::{Fsm, Machine};
use crate::deployment::Deployment;
use crate::error::{Error, ErrorKind, ErrorSet};
use bbr_core::ArtifactKind;
use bbr_storage::LocalArtifact;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupState {
    Ready,
    IsBackupable,
    ArtifactCreated,
    Locked,
    BackedUp,
    Unlocked,
    Drained,
    Finished,
}

bbr_core::simple_display! {
    BackupState {
        Ready => "ready",
        IsBackupable => "is-backupable",
        ArtifactCreated => "artifact-created",
        Locked => "locked",
        BackedUp => "backed-up",
        Unlocked => "unlocked",
        Drained => "drained",
        Finished => "finished",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupEvent {
    CheckIsBackupable,
    CreateArtifact,
    PreBackupLock,
    Backup,
    PostBackupUnlock,
    Drain,
    Cleanup,
}

bbr_core::simple_display! {
    BackupEvent {
        CheckIsBackupable => "check-is-backupable",
        CreateArtifact => "create-artifact",
        PreBackupLock => "pre-backup-lock",
        Backup => "backup",
        PostBackupUnlock => "post-backup-unlock",
        Drain => "drain",
        Cleanup => "cleanup",
    }
}

pub struct BackupMachine;

impl Machine for BackupMachine {
    type State = BackupState;
    type Event = BackupEvent;

    const INITIAL: BackupState = BackupState::Ready;

    fn next(state: BackupState, event: BackupEvent) -> Option<BackupState> {
        use BackupEvent as E;
        use BackupState as S;
        match (state, event) {
            (S::Ready, E::CheckIsBackupable) => Some(S::IsBackupable),
            (S::IsBackupable, E::CreateArtifact) => Some(S::ArtifactCreated),
            (S::ArtifactCreated, E::PreBackupLock) => Some(S::Locked),
            (S::Locked, E::Backup) => Some(S::BackedUp),
            (S::Locked | S::BackedUp, E::PostBackupUnlock) => Some(S::Unlocked),
            (S::Unlocked, E::Drain) => Some(S::Drained),
            (
                S::Ready | S::IsBackupable | S::ArtifactCreated | S::Unlocked | S::Drained,
                E::Cleanup,
            ) => Some(S::Finished),
            _ => None,
        }
    }
}

/// Where the local artifact goes and what extra files it carries.
#[derive(Debug, Clone)]
pub struct BackupOptions {
    pub artifact_parent: PathBuf,
    pub manifest: Option<String>,
}

impl BackupOptions {
    pub fn new(artifact_parent: impl Into<PathBuf>) -> Self {
        Self { artifact_parent: artifact_parent.into(), manifest: None }
    }

    bbr_core::setters! {
        option {
            manifest: String,
        }
    }
}

#[derive(Debug)]
pub struct BackupOutcome {
    pub errors: ErrorSet,
    /// Local artifact directory, when one was created.
    pub artifact_path: Option<PathBuf>,
    pub states: Vec<BackupState>,
}

pub struct BackupWorkflow<'a> {
    deployment: &'a mut Deployment,
    options: &'a BackupOptions,
    fsm: Fsm<BackupMachine>,
    errors: ErrorSet,
}

impl<'a> BackupWorkflow<'a> {
    pub fn new(deployment: &'a mut Deployment, options: &'a BackupOptions) -> Self {
        Self { deployment, options, fsm: Fsm::new(), errors: ErrorSet::new() }
    }

    pub async fn run(mut self) -> BackupOutcome {
        let started = Utc::now();
        tracing::info!(deployment = self.deployment.name(), "starting backup");

        let store = self.prepare(started).await;
        if let Some(store) = &store {
            self.lock_backup_unlock().await;
            self.drain(store, started).await;
        }
        self.cleanup().await;

        tracing::info!(
            deployment = self.deployment.name(),
            exit_code = self.errors.exit_code(),
            "backup finished"
        );
        BackupOutcome {
            errors: self.errors,
            artifact_path: store.map(|s| s.path().to_path_buf()),
            states: self.fsm.into_history(),
        }
    }

    fn fire(&mut self, event: BackupEvent) {
        if let Err(e) = self.fsm.fire(event) {
            self.errors.push(ErrorKind::Fatal, e);
        }
    }

    fn cancelled(&mut self) -> bool {
        if self.deployment.cancellation().is_cancelled() {
            self.errors.push(ErrorKind::Fatal, Error::Cancelled);
            return true;
        }
        false
    }

    /// Pre-flight checks, then the local artifact directory. Nothing runs
    /// on an instance unless every check passes.
    async fn prepare(&mut self, started: DateTime<Utc>) -> Option<LocalArtifact> {
        let checks = preflight(self.deployment);
        if !checks.is_empty() {
            self.errors.record(ErrorKind::Fatal, checks);
            return None;
        }
        self.fire(BackupEvent::CheckIsBackupable);

        let dirty = self.deployment.check_artifact_dir().await;
        if !dirty.is_empty() {
            self.errors.record(ErrorKind::Fatal, dirty);
            return None;
        }
        if self.cancelled() {
            return None;
        }

        let store = match create_store(self.deployment.name(), self.options, started) {
            Ok(store) => store,
            Err(e) => {
                self.errors.push(ErrorKind::Fatal, e);
                return None;
            }
        };
        tracing::info!(path = %store.path().display(), "created local artifact");
        self.fire(BackupEvent::CreateArtifact);
        Some(store)
    }

    async fn lock_backup_unlock(&mut self) {
        if self.cancelled() {
            return;
        }

        self.fire(BackupEvent::PreBackupLock);
        let locked = self.deployment.pre_backup_lock().await;
        let lock_failed = !locked.is_empty();
        self.errors.record(ErrorKind::Fatal, locked);

        if !lock_failed && !self.cancelled() {
            self.fire(BackupEvent::Backup);
            let backed_up = self.deployment.backup().await;
            self.errors.record(ErrorKind::Fatal, backed_up);
        }

        self.fire(BackupEvent::PostBackupUnlock);
        let unlocked = self.deployment.post_backup_unlock().await;
        self.errors.record(ErrorKind::PostBackupUnlock, unlocked);
    }

    async fn drain(&mut self, store: &LocalArtifact, started: DateTime<Utc>) {
        if self.errors.is_fatal() {
            tracing::info!(deployment = self.deployment.name(), "skipping drain after failure");
            return;
        }
        if self.cancelled() {
            return;
        }

        let drained = self.deployment.copy_remote_backups_to_local_artifact(store).await;
        if !drained.is_empty() {
            self.errors.record(ErrorKind::Fatal, drained);
            return;
        }
        store.set_backup_activity(started, Utc::now());
        match store.save_metadata() {
            Ok(()) => self.fire(BackupEvent::Drain),
            Err(e) => self.errors.push(ErrorKind::Fatal, e.into()),
        }
    }

    async fn cleanup(&mut self) {
        let errors = self.deployment.cleanup().await;
        self.errors.record(ErrorKind::Cleanup, errors);
        self.fire(BackupEvent::Cleanup);
    }
}

/// Checks that need nothing but the discovered jobs.
pub(crate) fn preflight(deployment: &Deployment) -> Vec<Error> {
    if !deployment.is_backupable() {
        return vec![Error::NotBackupable(deployment.name().to_string())];
    }
    let conflicts = deployment.custom_artifact_name_conflicts();
    if !conflicts.is_empty() {
        return conflicts;
    }
    match deployment.lock_order(ArtifactKind::Backup) {
        Ok(_) => Vec::new(),
        Err(e) => vec![e],
    }
}

fn create_store(
    deployment: &str,
    options: &BackupOptions,
    started: DateTime<Utc>,
) -> Result<LocalArtifact, Error> {
    let store = LocalArtifact::create(&options.artifact_parent, deployment, started)?;
    if let Some(manifest) = &options.manifest {
        store.save_manifest(manifest)?;
    }
    Ok(store)
}

/// Run a backup of `deployment` into a new artifact under the options'
/// parent directory.
pub async fn backup(deployment: &mut Deployment, options: &BackupOptions) -> BackupOutcome {
    BackupWorkflow::new(deployment, options).run().await
}

#[cfg(test)]
#[path = "backup_tests.rs"]
mod tests;
