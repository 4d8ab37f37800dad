// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Help output lists every target and command.

use crate::prelude::*;

#[test]
fn bbr_help_lists_targets() {
    cli().args(&["--help"]).passes().stdout_has("deployment").stdout_has("director");
}

#[test]
fn deployment_help_lists_commands() {
    cli()
        .args(&["deployment", "--help"])
        .passes()
        .stdout_has("pre-backup-check")
        .stdout_has("backup-cleanup")
        .stdout_has("restore-cleanup")
        .stdout_has("--all-deployments");
}

#[test]
fn backup_help_lists_flags() {
    cli()
        .args(&["deployment", "--target", "i.yml", "--username", "u", "backup", "--help"])
        .passes()
        .stdout_has("--with-manifest")
        .stdout_has("--artifact-path");
}

#[test]
fn version_is_printed() {
    cli().args(&["--version"]).passes().stdout_has("bbr");
}
