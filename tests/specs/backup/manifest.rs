// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `backup --with-manifest`

use crate::prelude::*;

const MANIFEST: &str = "\
name: redis
instance_groups:
  - name: redis
    jobs:
      - name: redis
        release: redis
";

#[test]
fn with_manifest_copies_the_manifest_into_the_artifact() {
    let sandbox = Sandbox::new();
    sandbox
        .inventory_with_manifest("redis", &[("redis", 0, "redis0")], MANIFEST)
        .data_job("redis0", "redis")
        .data("redis0", "redis", "dump.rdb", "snapshot");

    sandbox.bbr("redis").args(&["backup", "--with-manifest"]).passes();

    let saved = std::fs::read_to_string(sandbox.artifact().join("manifest.yml")).unwrap();
    similar_asserts::assert_eq!(saved, MANIFEST);
}

#[test]
fn without_the_flag_no_manifest_is_saved() {
    let sandbox = Sandbox::new();
    sandbox
        .inventory_with_manifest("redis", &[("redis", 0, "redis0")], MANIFEST)
        .data_job("redis0", "redis")
        .data("redis0", "redis", "dump.rdb", "snapshot");

    sandbox.bbr("redis").args(&["backup"]).passes();

    assert!(!sandbox.artifact().join("manifest.yml").exists());
}

#[test]
fn with_manifest_fails_when_the_deployment_has_none() {
    let sandbox = Sandbox::new();
    sandbox.inventory("redis", &[("redis", 0, "redis0")]).data_job("redis0", "redis");

    sandbox
        .bbr("redis")
        .args(&["backup", "--with-manifest"])
        .exits(1)
        .stderr_has("has no manifest to save");

    assert!(sandbox.artifacts().is_empty());
    assert!(sandbox.calls().is_empty());
}

#[test]
fn jobs_missing_from_the_manifest_fail_discovery() {
    let sandbox = Sandbox::new();
    sandbox
        .inventory_with_manifest("redis", &[("redis", 0, "redis0")], MANIFEST)
        .data_job("redis0", "redis")
        .data_job("redis0", "sentinel");

    sandbox
        .bbr("redis")
        .args(&["backup"])
        .exits(1)
        .stderr_has("Failed to discover deployment 'redis'")
        .stderr_has("sentinel");
}
