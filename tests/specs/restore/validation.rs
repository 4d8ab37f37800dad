// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifacts are validated before anything runs on an instance.

use crate::prelude::*;

fn backed_up() -> (Sandbox, std::path::PathBuf) {
    let sandbox = Sandbox::new();
    sandbox
        .inventory("redis", &[("redis", 0, "redis0")])
        .data_job("redis0", "redis")
        .data("redis0", "redis", "dump.rdb", "snapshot");
    sandbox.bbr("redis").args(&["backup"]).passes();
    std::fs::remove_file(sandbox.path().join("calls.log")).unwrap();
    let artifact = sandbox.artifact();
    (sandbox, artifact)
}

fn restore(sandbox: &Sandbox, artifact: &std::path::Path) -> CliBuilder {
    sandbox.bbr("redis").args(&["restore", "--artifact-path", &artifact.display().to_string()])
}

#[test]
fn tampered_checksum_rejects_the_artifact() {
    let (sandbox, artifact) = backed_up();
    let path = artifact.join("metadata");
    let mut doc: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc["instances"][0]["artifacts"][0]["checksums"]["dump.rdb"] = "0".repeat(64).into();
    std::fs::write(&path, serde_yaml::to_string(&doc).unwrap()).unwrap();

    restore(&sandbox, &artifact).exits(1).stderr_has("corrupted");

    assert!(sandbox.calls().is_empty());
    assert!(!sandbox.remote_artifact_root("redis0").exists());
}

#[test]
fn missing_payload_rejects_the_artifact() {
    let (sandbox, artifact) = backed_up();
    std::fs::remove_file(artifact.join("redis-0-redis.tar")).unwrap();

    restore(&sandbox, &artifact).exits(1);

    assert!(sandbox.calls().is_empty());
}

#[test]
fn missing_artifact_directory_fails() {
    let sandbox = Sandbox::new();
    sandbox.inventory("redis", &[("redis", 0, "redis0")]).data_job("redis0", "redis");

    restore(&sandbox, &sandbox.path().join("nowhere")).exits(1);

    assert!(sandbox.calls().is_empty());
}

#[test]
fn instances_without_a_recorded_artifact_are_refused() {
    let (sandbox, artifact) = backed_up();
    sandbox
        .inventory("redis", &[("redis", 0, "redis0"), ("redis", 1, "redis1")])
        .data_job("redis1", "redis");

    restore(&sandbox, &artifact).exits(1).stderr_has("redis/1");

    assert!(sandbox.calls().is_empty());
    assert!(!sandbox.remote_artifact_root("redis0").exists());
}

#[test]
fn deployments_without_restore_scripts_are_not_restorable() {
    let (sandbox, artifact) = backed_up();
    std::fs::remove_file(sandbox.instance("redis0").join("var/vcap/jobs/redis/bin/bbr/restore"))
        .unwrap();

    restore(&sandbox, &artifact).exits(1).stderr_has("has no restore scripts");
}
