// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backup followed by restore.

use crate::prelude::*;

fn backed_up() -> (Sandbox, String) {
    let sandbox = Sandbox::new();
    sandbox
        .inventory("redis", &[("redis", 0, "redis0"), ("redis", 1, "redis1")])
        .data_job("redis0", "redis")
        .data_job("redis1", "redis")
        .data("redis0", "redis", "dump.rdb", "zero")
        .data("redis1", "redis", "dump.rdb", "one");
    sandbox.bbr("redis").args(&["backup"]).passes();
    let artifact = sandbox.artifact().display().to_string();
    (sandbox, artifact)
}

#[test]
fn restore_puts_every_instance_back() {
    let (sandbox, artifact) = backed_up();
    sandbox
        .data("redis0", "redis", "dump.rdb", "changed")
        .data("redis1", "redis", "dump.rdb", "changed");

    sandbox
        .bbr("redis")
        .args(&["restore", "--artifact-path", &artifact])
        .passes()
        .stdout_has("Restored deployment 'redis'");

    assert_eq!(sandbox.read_data("redis0", "redis", "dump.rdb"), "zero");
    assert_eq!(sandbox.read_data("redis1", "redis", "dump.rdb"), "one");
    assert!(!sandbox.remote_artifact_root("redis0").exists());
    assert!(!sandbox.remote_artifact_root("redis1").exists());
}

#[test]
fn failing_restore_script_is_fatal() {
    let (sandbox, artifact) = backed_up();
    sandbox.script("redis1", "redis", "restore", "echo 'no space' >&2\nexit 1\n");

    sandbox
        .bbr("redis")
        .args(&["restore", "--artifact-path", &artifact])
        .exits(1)
        .stderr_has("no space");

    assert!(!sandbox.remote_artifact_root("redis1").exists());
}

#[test]
fn restore_runs_in_restore_lock_order() {
    let sandbox = Sandbox::new();
    let manifest = "\
instance_groups:
  - name: db
    jobs:
      - name: postgres
        release: pg
  - name: web
    jobs:
      - name: app
        release: app
";
    sandbox
        .inventory_with_manifest("shop", &[("db", 0, "db0"), ("web", 0, "web0")], manifest)
        .data_job("db0", "postgres")
        .data_job("web0", "app")
        .data("db0", "postgres", "rows", "1")
        .data("web0", "app", "uploads", "2")
        .script(
            "db0",
            "postgres",
            "metadata",
            "cat <<'YAML'\nrestore_should_be_locked_before:\n  - job_name: app\n    release: app\n\
             YAML\n",
        );
    sandbox.bbr("shop").args(&["backup"]).passes();
    let artifact = sandbox.artifact().display().to_string();
    std::fs::remove_file(sandbox.path().join("calls.log")).unwrap();

    sandbox.bbr("shop").args(&["restore", "--artifact-path", &artifact]).passes();

    similar_asserts::assert_eq!(
        sandbox.calls(),
        vec!["db0 postgres restore", "web0 app restore"]
    );
}
