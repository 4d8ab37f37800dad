// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `pre-backup-check` never runs a job script.

use crate::prelude::*;

#[test]
fn healthy_deployment_can_be_backed_up() {
    let sandbox = Sandbox::new();
    sandbox
        .inventory("redis", &[("redis", 0, "redis0")])
        .data_job("redis0", "redis")
        .script("redis0", "redis", "pre-backup-lock", "");

    sandbox
        .bbr("redis")
        .args(&["pre-backup-check"])
        .passes()
        .stdout_has("Deployment 'redis' can be backed up.");

    assert!(sandbox.calls().is_empty());
    assert!(sandbox.artifacts().is_empty());
}

#[test]
fn leftover_artifact_directory_fails_the_check() {
    let sandbox = Sandbox::new();
    sandbox.inventory("redis", &[("redis", 0, "redis0")]).data_job("redis0", "redis");
    std::fs::create_dir_all(sandbox.remote_artifact_root("redis0")).unwrap();

    sandbox
        .bbr("redis")
        .args(&["pre-backup-check"])
        .exits(16)
        .stdout_has("cannot be backed up")
        .stderr_has("already exists");

    assert!(sandbox.remote_artifact_root("redis0").exists());
}

#[test]
fn deployment_without_backup_scripts_fails_the_check() {
    let sandbox = Sandbox::new();
    sandbox.inventory("redis", &[("redis", 0, "redis0")]).script("redis0", "redis", "restore", "");

    sandbox
        .bbr("redis")
        .args(&["pre-backup-check"])
        .exits(1)
        .stdout_has("cannot be backed up")
        .stderr_has("has no backup scripts");
}
