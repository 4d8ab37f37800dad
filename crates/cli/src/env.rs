// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the CLI.

use std::path::PathBuf;

/// `EnvFilter` directives used when `--debug` is not given.
pub fn log_filter() -> Option<String> {
    std::env::var("BBR_LOG").ok().filter(|s| !s.is_empty())
}

/// ssh client binary (default `ssh`).
pub fn ssh_bin() -> String {
    std::env::var("BBR_SSH_BIN").ok().filter(|s| !s.is_empty()).unwrap_or_else(|| "ssh".into())
}

/// Directory holding ssh ControlMaster sockets (default: the temp dir).
pub fn ssh_control_dir() -> PathBuf {
    std::env::var_os("BBR_SSH_CONTROL_DIR")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(std::env::temp_dir)
}

/// Parent directory for new backup artifacts when `--artifact-path` is not
/// given (default: the working directory).
pub fn artifact_root() -> PathBuf {
    std::env::var_os("BBR_ARTIFACT_ROOT")
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}
