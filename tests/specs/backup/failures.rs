// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exit codes for failing backups.

use crate::prelude::*;

fn sandbox() -> Sandbox {
    let sandbox = Sandbox::new();
    sandbox
        .inventory("redis", &[("redis", 0, "redis0")])
        .data_job("redis0", "redis")
        .data("redis0", "redis", "dump.rdb", "snapshot")
        .script("redis0", "redis", "pre-backup-lock", "")
        .script("redis0", "redis", "post-backup-unlock", "");
    sandbox
}

#[test]
fn failing_backup_script_is_fatal() {
    let sandbox = sandbox();
    sandbox.script("redis0", "redis", "backup", "echo 'disk full' >&2\nexit 3\n");

    sandbox
        .bbr("redis")
        .args(&["backup"])
        .exits(1)
        .stderr_has("1 error occurred")
        .stderr_has("exit code: 3")
        .stderr_has("disk full");

    assert!(sandbox.calls().contains(&"redis0 redis post-backup-unlock".to_string()));
    assert!(!sandbox.remote_artifact_root("redis0").exists());
}

#[test]
fn failing_unlock_alone_exits_two() {
    let sandbox = sandbox();
    sandbox.script("redis0", "redis", "post-backup-unlock", "exit 1\n");

    sandbox
        .bbr("redis")
        .args(&["backup"])
        .exits(2)
        .stderr_has("post-backup-unlock");

    let artifact = sandbox.artifact();
    assert!(artifact.join("metadata").is_file());
    assert!(artifact.join("redis-0-redis.tar").is_file());
}

#[test]
fn fatal_and_unlock_failures_combine() {
    let sandbox = sandbox();
    sandbox
        .script("redis0", "redis", "backup", "exit 1\n")
        .script("redis0", "redis", "post-backup-unlock", "exit 1\n");

    sandbox.bbr("redis").args(&["backup"]).exits(3).stderr_has("2 errors occurred");
}

#[test]
fn leftover_artifact_directory_is_never_removed() {
    let sandbox = sandbox();
    let leftover = sandbox.remote_artifact_root("redis0").join("redis");
    std::fs::create_dir_all(&leftover).unwrap();
    std::fs::write(leftover.join("old"), "keep me").unwrap();

    sandbox
        .bbr("redis")
        .args(&["backup"])
        .exits(16)
        .stderr_has("already exists")
        .stderr_has("backup-cleanup");

    assert_eq!(std::fs::read_to_string(leftover.join("old")).unwrap(), "keep me");
    assert!(sandbox.calls().is_empty());
    assert!(sandbox.artifacts().is_empty());
}
