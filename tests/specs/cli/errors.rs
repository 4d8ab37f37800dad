// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Setup failures exit 1 before any instance is touched.

use crate::prelude::*;

#[test]
fn missing_inventory_fails() {
    let sandbox = Sandbox::new();
    sandbox.bbr("redis").args(&["backup"]).exits(1).stderr_has("cannot load inventory");
}

#[test]
fn unknown_deployment_fails() {
    let sandbox = Sandbox::new();
    sandbox.inventory("redis", &[("redis", 0, "redis0")]);

    sandbox.bbr("postgres").args(&["backup"]).exits(1).stderr_has("'postgres' not found");
}

#[test]
fn instance_needs_a_transport() {
    let sandbox = Sandbox::new();
    sandbox.file(
        "inventory.yml",
        "deployments:\n  - name: redis\n    instances:\n      - group: redis\n        index: 0\n",
    );

    sandbox
        .bbr("redis")
        .args(&["pre-backup-check"])
        .exits(1)
        .stderr_has("one of host or local_root is required");
}

#[test]
fn restore_refuses_all_deployments() {
    let sandbox = Sandbox::new();
    sandbox.inventory("redis", &[("redis", 0, "redis0")]);

    sandbox
        .bbr_target()
        .args(&["--all-deployments", "restore", "--artifact-path", "x"])
        .exits(1)
        .stderr_has("--all-deployments");
}
