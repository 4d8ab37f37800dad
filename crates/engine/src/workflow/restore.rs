// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Restore workflow.
//!
//! ```text
//! ready -> restorable-confirmed -> artifact-validated -> manifest-matched
//!       -> uploaded -> restored -> finished
//! ```
//!
//! The local artifact is verified before anything touches an instance, and
//! nothing is uploaded unless every artifact matches a live job.

use super::fsm::{Fsm, Machine};
use crate::deployment::Deployment;
use crate::error::{Error, ErrorKind, ErrorSet};
use bbr_core::ArtifactKind;
use bbr_storage::LocalArtifact;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreState {
    Ready,
    RestorableConfirmed,
    ArtifactValidated,
    ManifestMatched,
    Uploaded,
    Restored,
    Finished,
}

bbr_core::simple_display! {
    RestoreState {
        Ready => "ready",
        RestorableConfirmed => "restorable-confirmed",
        ArtifactValidated => "artifact-validated",
        ManifestMatched => "manifest-matched",
        Uploaded => "uploaded",
        Restored => "restored",
        Finished => "finished",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreEvent {
    ConfirmRestorable,
    ValidateArtifact,
    MatchManifest,
    Upload,
    Restore,
    Cleanup,
}

bbr_core::simple_display! {
    RestoreEvent {
        ConfirmRestorable => "confirm-restorable",
        ValidateArtifact => "validate-artifact",
        MatchManifest => "match-manifest",
        Upload => "upload",
        Restore => "restore",
        Cleanup => "cleanup",
    }
}

pub struct RestoreMachine;

impl Machine for RestoreMachine {
    type State = RestoreState;
    type Event = RestoreEvent;

    const INITIAL: RestoreState = RestoreState::Ready;

    fn next(state: RestoreState, event: RestoreEvent) -> Option<RestoreState> {
        use RestoreEvent as E;
        use RestoreState as S;
        match (state, event) {
            (S::Ready, E::ConfirmRestorable) => Some(S::RestorableConfirmed),
            (S::RestorableConfirmed, E::ValidateArtifact) => Some(S::ArtifactValidated),
            (S::ArtifactValidated, E::MatchManifest) => Some(S::ManifestMatched),
            (S::ManifestMatched, E::Upload) => Some(S::Uploaded),
            (S::Uploaded, E::Restore) => Some(S::Restored),
            (S::Finished, E::Cleanup) => None,
            (_, E::Cleanup) => Some(S::Finished),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct RestoreOutcome {
    pub errors: ErrorSet,
    pub states: Vec<RestoreState>,
}

pub struct RestoreWorkflow<'a> {
    deployment: &'a mut Deployment,
    artifact_path: &'a Path,
    fsm: Fsm<RestoreMachine>,
    errors: ErrorSet,
}

impl<'a> RestoreWorkflow<'a> {
    pub fn new(deployment: &'a mut Deployment, artifact_path: &'a Path) -> Self {
        Self { deployment, artifact_path, fsm: Fsm::new(), errors: ErrorSet::new() }
    }

    pub async fn run(mut self) -> RestoreOutcome {
        tracing::info!(
            deployment = self.deployment.name(),
            artifact = %self.artifact_path.display(),
            "starting restore"
        );

        if let Some(store) = self.prepare().await {
            self.upload_and_restore(&store).await;
        }
        self.cleanup().await;

        tracing::info!(
            deployment = self.deployment.name(),
            exit_code = self.errors.exit_code(),
            "restore finished"
        );
        RestoreOutcome { errors: self.errors, states: self.fsm.into_history() }
    }

    fn fire(&mut self, event: RestoreEvent) {
        if let Err(e) = self.fsm.fire(event) {
            self.errors.push(ErrorKind::Fatal, e);
        }
    }

    fn fail(&mut self, errors: Vec<Error>) -> bool {
        if errors.is_empty() {
            return false;
        }
        self.errors.record(ErrorKind::Fatal, errors);
        true
    }

    fn cancelled(&mut self) -> bool {
        if self.deployment.cancellation().is_cancelled() {
            self.errors.push(ErrorKind::Fatal, Error::Cancelled);
            return true;
        }
        false
    }

    async fn prepare(&mut self) -> Option<LocalArtifact> {
        let checks = restorable(self.deployment);
        if self.fail(checks) {
            return None;
        }
        self.fire(RestoreEvent::ConfirmRestorable);

        let store = match self.validated_store().await {
            Ok(store) => store,
            Err(e) => {
                self.errors.push(ErrorKind::Fatal, e);
                return None;
            }
        };
        self.fire(RestoreEvent::ValidateArtifact);

        let unmatched = self.deployment.validate_is_restorable(&store.artifacts());
        if self.fail(unmatched) {
            return None;
        }
        let dirty = self.deployment.check_artifact_dir().await;
        if self.fail(dirty) {
            return None;
        }
        self.fire(RestoreEvent::MatchManifest);
        Some(store)
    }

    async fn validated_store(&self) -> Result<LocalArtifact, Error> {
        let store = LocalArtifact::open(self.artifact_path)?;
        if !store.valid().await? {
            return Err(Error::InvalidArtifact(self.artifact_path.to_path_buf()));
        }
        tracing::info!(artifact = %self.artifact_path.display(), "backup artifact verified");
        Ok(store)
    }

    async fn upload_and_restore(&mut self, store: &LocalArtifact) {
        if self.cancelled() {
            return;
        }
        let uploaded = self.deployment.copy_local_backup_to_remote(store).await;
        if self.fail(uploaded) {
            return;
        }
        self.fire(RestoreEvent::Upload);

        if self.cancelled() {
            return;
        }
        let restored = self.deployment.restore().await;
        if self.fail(restored) {
            return;
        }
        self.fire(RestoreEvent::Restore);
    }

    async fn cleanup(&mut self) {
        let errors = self.deployment.cleanup().await;
        self.errors.record(ErrorKind::Cleanup, errors);
        self.fire(RestoreEvent::Cleanup);
    }
}

fn restorable(deployment: &Deployment) -> Vec<Error> {
    if !deployment.is_restorable() {
        return vec![Error::NotRestorable(deployment.name().to_string())];
    }
    match deployment.lock_order(ArtifactKind::Restore) {
        Ok(_) => Vec::new(),
        Err(e) => vec![e],
    }
}

/// Restore `deployment` from the artifact directory at `artifact_path`.
pub async fn restore(deployment: &mut Deployment, artifact_path: &Path) -> RestoreOutcome {
    RestoreWorkflow::new(deployment, artifact_path).run().await
}

#[cfg(test)]
#[path = "restore_tests.rs"]
mod tests;
