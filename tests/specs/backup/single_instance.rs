// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One instance, one backup script, no metadata.

use crate::prelude::*;

fn sandbox() -> Sandbox {
    let sandbox = Sandbox::new();
    sandbox
        .inventory("redis", &[("redis", 0, "redis0")])
        .data_job("redis0", "redis")
        .data("redis0", "redis", "dump.rdb", "snapshot");
    sandbox
}

#[test]
fn backup_writes_artifact_and_cleans_up() {
    let sandbox = sandbox();

    sandbox.bbr("redis").args(&["backup"]).passes().stdout_has("Backup created in");

    let artifact = sandbox.artifact();
    let name = artifact.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("redis_"), "{name}");
    assert!(name.ends_with('Z'), "{name}");
    assert!(artifact.join("redis-0-redis.tar").is_file());
    let metadata = std::fs::read_to_string(artifact.join("metadata")).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&metadata).unwrap();
    assert_eq!(doc["instances"][0]["name"], "redis");
    assert_eq!(doc["instances"][0]["artifacts"][0]["name"], "redis");
    assert!(doc["instances"][0]["artifacts"][0]["checksums"]["dump.rdb"].is_string());
    assert!(doc["backup_activity"]["start_time"].is_string());
    assert!(!sandbox.remote_artifact_root("redis0").exists());
    assert_eq!(sandbox.calls(), vec!["redis0 redis backup"]);
}

#[test]
fn artifact_path_overrides_artifact_root() {
    let sandbox = sandbox();
    let target = sandbox.path().join("elsewhere");

    sandbox
        .bbr("redis")
        .args(&["backup", "--artifact-path", &target.display().to_string()])
        .passes();

    assert!(sandbox.artifacts().is_empty());
    assert_eq!(std::fs::read_dir(target).unwrap().count(), 1);
}

#[test]
fn jobs_without_backup_scripts_are_not_backupable() {
    let sandbox = Sandbox::new();
    sandbox.inventory("redis", &[("redis", 0, "redis0")]).script("redis0", "redis", "restore", "");

    sandbox.bbr("redis").args(&["backup"]).exits(1).stderr_has("has no backup scripts");
    assert!(sandbox.artifacts().is_empty());
}

#[test]
fn custom_backup_name_is_recorded_as_custom_artifact() {
    let sandbox = sandbox();
    sandbox.script("redis0", "redis", "metadata", "echo 'backup_name: cache'\n");

    sandbox.bbr("redis").args(&["backup"]).passes();

    let artifact = sandbox.artifact();
    assert!(artifact.join("redis-0-cache.tar").is_file());
    let metadata = std::fs::read_to_string(artifact.join("metadata")).unwrap();
    let doc: serde_yaml::Value = serde_yaml::from_str(&metadata).unwrap();
    assert_eq!(doc["custom_artifacts"][0]["name"], "cache");
}
