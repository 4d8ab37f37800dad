// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `--all-deployments`

use crate::prelude::*;

fn two_deployments() -> Sandbox {
    let sandbox = Sandbox::new();
    sandbox
        .inventory_of(&[("redis", &[("redis", 0, "redis0")]), ("shop", &[("db", 0, "db0")])])
        .data_job("redis0", "redis")
        .data_job("db0", "postgres")
        .data("redis0", "redis", "dump.rdb", "snapshot")
        .data("db0", "postgres", "rows", "1");
    sandbox
}

#[test]
fn backs_up_every_deployment() {
    let sandbox = two_deployments();

    let run = sandbox.bbr_target().args(&["--all-deployments", "backup"]).passes();

    assert!(run.stdout().contains("Deployment 'redis':"), "{run}");
    assert!(run.stdout().contains("Deployment 'shop':"), "{run}");
    let artifacts = sandbox.artifacts();
    assert_eq!(artifacts.len(), 2, "{artifacts:?}");
    assert!(artifacts[0].file_name().unwrap().to_string_lossy().starts_with("redis_"));
    assert!(artifacts[1].file_name().unwrap().to_string_lossy().starts_with("shop_"));
}

#[test]
fn one_failure_does_not_stop_the_others() {
    let sandbox = two_deployments();
    sandbox.script("db0", "postgres", "backup", "exit 1\n");

    sandbox
        .bbr_target()
        .args(&["--all-deployments", "backup"])
        .exits(1)
        .stderr_has("1 out of 2 deployments failed");

    assert!(sandbox.calls().contains(&"redis0 redis backup".to_string()));
    assert!(sandbox
        .artifacts()
        .iter()
        .any(|a| a.join("redis-0-redis.tar").is_file()));
}

#[test]
fn exit_codes_of_every_deployment_are_combined() {
    let sandbox = two_deployments();
    sandbox.script("db0", "postgres", "backup", "exit 1\n");
    std::fs::create_dir_all(sandbox.remote_artifact_root("redis0")).unwrap();

    sandbox
        .bbr_target()
        .args(&["--all-deployments", "backup"])
        .exits(17)
        .stderr_has("2 out of 2 deployments failed");
}

#[test]
fn pre_backup_check_reports_each_deployment() {
    let sandbox = two_deployments();

    sandbox
        .bbr_target()
        .args(&["--all-deployments", "pre-backup-check"])
        .passes()
        .stdout_has("Deployment 'redis' can be backed up.")
        .stdout_has("Deployment 'shop' can be backed up.");
}
