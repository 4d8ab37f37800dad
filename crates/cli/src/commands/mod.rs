// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

mod backup;
mod check;
mod cleanup;
mod restore;

use crate::exit_error::ExitError;
use crate::target::Selection;
use anyhow::Result;
use bbr_engine::{summarize, Deployment, ErrorSet};
use clap::Subcommand;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check that a deployment can be backed up, without running any job script
    PreBackupCheck,
    /// Back up a deployment into a new local artifact
    Backup {
        /// Copy the deployment manifest into the artifact
        #[arg(long)]
        with_manifest: bool,
        /// Parent directory for the artifact (default: BBR_ARTIFACT_ROOT, else .)
        #[arg(long)]
        artifact_path: Option<PathBuf>,
    },
    /// Remove what an interrupted backup left on the instances
    BackupCleanup,
    /// Restore a deployment from a local artifact
    Restore {
        /// Artifact directory written by `backup`
        #[arg(long)]
        artifact_path: PathBuf,
    },
    /// Remove what an interrupted restore left on the instances
    RestoreCleanup,
}

/// Run the selected command on every selected deployment. The exit code is
/// the bitwise OR of the per-deployment codes.
pub async fn execute(selection: &Selection, cancel: CancellationToken) -> Result<()> {
    let mut code = 0;
    let mut failed = 0;
    for name in &selection.deployments {
        if selection.all {
            println!("Deployment '{name}':");
        }
        let deployment_code = run_one(selection, name, cancel.clone()).await;
        if deployment_code != 0 {
            failed += 1;
        }
        code |= deployment_code;
    }

    if code == 0 {
        return Ok(());
    }
    let exit = ExitError::code(code);
    if !selection.all {
        return Err(exit.into());
    }
    let total = selection.deployments.len();
    Err(exit.with_summary(format!("{failed} out of {total} deployments failed")).into())
}

async fn run_one(selection: &Selection, name: &str, cancel: CancellationToken) -> i32 {
    let manifest = match &selection.command {
        Command::Backup { with_manifest: true, .. } => match selection.manager.manifest(name) {
            Ok(Some(manifest)) => Some(manifest),
            Ok(None) => {
                eprintln!("Deployment '{name}' has no manifest to save");
                return 1;
            }
            Err(e) => {
                eprintln!("{e}");
                return 1;
            }
        },
        _ => None,
    };

    let mut deployment = match selection.manager.find(name, cancel).await {
        Ok(deployment) => deployment,
        Err(e) => {
            eprintln!("Failed to discover deployment '{name}': {e}");
            return 1;
        }
    };

    match &selection.command {
        Command::PreBackupCheck => check::run(&mut deployment).await,
        Command::Backup { artifact_path, .. } => {
            backup::run(&mut deployment, artifact_path.clone(), manifest).await
        }
        Command::BackupCleanup => cleanup::run(&mut deployment, "backup").await,
        Command::Restore { artifact_path } => restore::run(&mut deployment, artifact_path).await,
        Command::RestoreCleanup => cleanup::run(&mut deployment, "restore").await,
    }
}

/// Print the failure summary and an optional hint to stderr, and return
/// the exit code for `errors`.
fn report(deployment: &Deployment, errors: &ErrorSet, hint: Option<&str>) -> i32 {
    if errors.is_nil() {
        return 0;
    }
    eprint!("{}", summarize(errors));
    if let Some(hint) = hint {
        eprintln!("{hint}");
    }
    tracing::debug!(deployment = deployment.name(), exit_code = errors.exit_code(), "failed");
    errors.exit_code()
}
