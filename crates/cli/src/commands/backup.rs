// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `bbr ... backup`

use crate::env;
use bbr_engine::{backup, BackupOptions, Deployment, ErrorKind};
use std::path::PathBuf;

pub async fn run(
    deployment: &mut Deployment,
    artifact_path: Option<PathBuf>,
    manifest: Option<String>,
) -> i32 {
    let mut options = BackupOptions::new(artifact_path.unwrap_or_else(env::artifact_root));
    if let Some(manifest) = manifest {
        options = options.manifest(manifest);
    }

    let outcome = backup(deployment, &options).await;
    if let Some(path) = &outcome.artifact_path {
        if !outcome.errors.is_fatal() {
            println!("Backup created in {}", path.display());
        }
    }

    let hint = if outcome.errors.has(ErrorKind::ArtifactDirExists) {
        Some(format!(
            "A previous backup or restore left files on the instances. \
             Run `bbr ... --deployment {} backup-cleanup` before trying again.",
            deployment.name()
        ))
    } else if outcome.errors.is_cleanup() || outcome.errors.is_post_backup() {
        Some(
            "It is recommended that you run `bbr ... backup-cleanup` to ensure that any temp \
             files are cleaned up and all jobs are unlocked."
                .to_string(),
        )
    } else {
        None
    };
    super::report(deployment, &outcome.errors, hint.as_deref())
}
