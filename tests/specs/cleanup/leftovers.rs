// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `backup-cleanup` and `restore-cleanup`

use crate::prelude::*;

fn interrupted() -> Sandbox {
    let sandbox = Sandbox::new();
    sandbox
        .inventory("redis", &[("redis", 0, "redis0"), ("redis", 1, "redis1")])
        .data_job("redis0", "redis")
        .data_job("redis1", "redis")
        .data("redis0", "redis", "dump.rdb", "snapshot")
        .data("redis1", "redis", "dump.rdb", "snapshot");
    let leftover = sandbox.remote_artifact_root("redis1").join("redis");
    std::fs::create_dir_all(&leftover).unwrap();
    std::fs::write(leftover.join("dump.rdb"), "partial").unwrap();
    sandbox
}

#[yare::parameterized(
    backup = { "backup-cleanup", "'redis' cleaned up after backup" },
    restore = { "restore-cleanup", "'redis' cleaned up after restore" },
)]
fn cleanup_removes_leftover_artifact_directories(command: &str, message: &str) {
    let sandbox = interrupted();

    sandbox.bbr("redis").args(&[command]).passes().stdout_has(message);

    assert!(!sandbox.remote_artifact_root("redis1").exists());
    assert!(sandbox.calls().is_empty());
}

#[test]
fn backup_succeeds_after_cleanup() {
    let sandbox = interrupted();
    sandbox.bbr("redis").args(&["backup"]).exits(16);

    sandbox.bbr("redis").args(&["backup-cleanup"]).passes();
    sandbox.bbr("redis").args(&["backup"]).passes();

    assert!(sandbox.artifact().join("redis-1-redis.tar").is_file());
}

#[test]
fn cleanup_of_a_clean_deployment_passes() {
    let sandbox = Sandbox::new();
    sandbox.inventory("redis", &[("redis", 0, "redis0")]).data_job("redis0", "redis");

    sandbox.bbr("redis").args(&["backup-cleanup"]).passes();
}
