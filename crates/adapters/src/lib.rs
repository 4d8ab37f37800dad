// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for external I/O: remote shells, manifests and the deployment directory

pub mod directory;
pub mod manifest;
pub mod remote;
pub mod shell;
pub mod subprocess;

pub use directory::{
    DeploymentDirectory, DirectorHost, DirectoryError, InstanceConnection, Inventory,
    SshCredentials,
};
pub use manifest::{ManifestError, ManifestQuerier, NoopManifest, YamlManifest};
pub use remote::{RemoteError, RemoteRunner};
pub use shell::{CommandOutput, LocalShell, RemoteShell, ShellError, SshConfig, SshShell};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use shell::{FakeShell, Journal};
