// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::deployment::Deployment;
use crate::error::{ErrorKind, ErrorSet};

/// Remove whatever an interrupted backup or restore left on the instances
/// and close every session.
pub async fn cleanup_previous(deployment: &mut Deployment) -> ErrorSet {
    tracing::info!(deployment = deployment.name(), "cleaning up previous run");
    let mut errors = ErrorSet::new();
    errors.record(ErrorKind::Cleanup, deployment.cleanup_previous().await);
    errors
}

#[cfg(test)]
#[path = "cleanup_tests.rs"]
mod tests;
