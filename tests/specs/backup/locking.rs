// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock ordering across instances.

use crate::prelude::*;

const MANIFEST: &str = "\
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

const POSTGRES_BEFORE_APP: &str = "\
cat <<'YAML'
backup_should_be_locked_before:
  - job_name: app
    release: app
YAML
";

/// `postgres` on db/0 must be locked before `app` on web/0, against the
/// `(release, job)` order.
fn sandbox() -> Sandbox {
    let sandbox = Sandbox::new();
    sandbox
        .inventory_with_manifest("shop", &[("db", 0, "db0"), ("web", 0, "web0")], MANIFEST)
        .data_job("db0", "postgres")
        .data_job("web0", "app")
        .data("db0", "postgres", "rows", "1")
        .data("web0", "app", "uploads", "2")
        .script("db0", "postgres", "metadata", POSTGRES_BEFORE_APP);
    for (instance, job) in [("db0", "postgres"), ("web0", "app")] {
        sandbox
            .script(instance, job, "pre-backup-lock", "")
            .script(instance, job, "post-backup-unlock", "");
    }
    sandbox
}

fn lock_calls(sandbox: &Sandbox) -> Vec<String> {
    sandbox.calls().into_iter().filter(|call| call.ends_with("lock")).collect()
}

#[test]
fn locks_in_dependency_order_and_unlocks_in_reverse() {
    let sandbox = sandbox();

    sandbox.bbr("shop").args(&["backup"]).passes();

    similar_asserts::assert_eq!(
        lock_calls(&sandbox),
        vec![
            "db0 postgres pre-backup-lock",
            "web0 app pre-backup-lock",
            "web0 app post-backup-unlock",
            "db0 postgres post-backup-unlock",
        ]
    );
    let calls = sandbox.calls();
    let backups: Vec<_> = calls.iter().filter(|call| call.ends_with(" backup")).collect();
    assert_eq!(backups.len(), 2, "{calls:?}");
    assert_eq!(calls[2..4].iter().filter(|call| call.ends_with(" backup")).count(), 2);
    assert!(sandbox.artifact().join("db-0-postgres.tar").is_file());
    assert!(sandbox.artifact().join("web-0-app.tar").is_file());
}

#[test]
fn failed_lock_skips_backup_but_still_unlocks() {
    let sandbox = sandbox();
    sandbox.script("db0", "postgres", "pre-backup-lock", "echo 'lock refused' >&2\nexit 1\n");

    sandbox
        .bbr("shop")
        .args(&["backup"])
        .exits(1)
        .stderr_has("pre-backup-lock")
        .stderr_has("lock refused");

    similar_asserts::assert_eq!(
        sandbox.calls(),
        vec![
            "db0 postgres pre-backup-lock",
            "web0 app post-backup-unlock",
            "db0 postgres post-backup-unlock",
        ]
    );
}

#[test]
fn cyclic_lock_order_is_refused_before_any_script_runs() {
    let sandbox = sandbox();
    sandbox.script(
        "web0",
        "app",
        "metadata",
        "cat <<'YAML'\nbackup_should_be_locked_before:\n  - job_name: postgres\n    release: pg\n\
         YAML\n",
    );

    sandbox.bbr("shop").args(&["backup"]).exits(8).stderr_has("cyclic");

    assert!(sandbox.calls().is_empty(), "{:?}", sandbox.calls());
    assert!(sandbox.artifacts().is_empty());
}

#[test]
fn lock_target_outside_the_deployment_is_a_locking_error() {
    let sandbox = sandbox();
    sandbox.script(
        "db0",
        "postgres",
        "metadata",
        "cat <<'YAML'\nbackup_should_be_locked_before:\n  - job_name: cache\n    release: redis\n\
         YAML\n",
    );

    sandbox.bbr("shop").args(&["backup"]).exits(8).stderr_has("not in the deployment");
    assert!(sandbox.calls().is_empty());
}
