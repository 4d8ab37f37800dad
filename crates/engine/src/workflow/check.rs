// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dry run of the backup pre-flight. No job script runs.

use super::backup::preflight;
use crate::deployment::Deployment;
use crate::error::{ErrorKind, ErrorSet};

/// Check whether `deployment` can be backed up right now, then close every
/// session.
pub async fn pre_backup_check(deployment: &mut Deployment) -> ErrorSet {
    let mut errors = ErrorSet::new();
    errors.record(ErrorKind::Fatal, preflight(deployment));
    if errors.is_nil() {
        errors.record(ErrorKind::Fatal, deployment.check_artifact_dir().await);
    }
    errors.record(ErrorKind::Cleanup, deployment.cleanup().await);

    if errors.is_fatal() {
        tracing::info!(deployment = deployment.name(), "deployment cannot be backed up");
    } else {
        tracing::info!(deployment = deployment.name(), "deployment can be backed up");
    }
    errors
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
