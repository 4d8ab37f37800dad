// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bbr-engine: discovery, lock ordering and the backup and restore workflows

mod artifact;
mod deployment;
mod error;
mod finder;
mod instance;
mod manager;
mod orderer;
pub mod summary;
pub mod workflow;

#[cfg(test)]
mod test_helpers;

pub use artifact::{mismatched_files, resolve_restore_artifact, Artifact};
pub use deployment::Deployment;
pub use error::{Error, ErrorKind, ErrorSet};
pub use finder::find_jobs;
pub use instance::Instance;
pub use manager::DeploymentManager;
pub use orderer::{lock_order, LockOrderer};
pub use summary::{summarize, Failure};
pub use workflow::{
    backup, cleanup_previous, pre_backup_check, restore, BackupOptions, BackupOutcome,
    BackupState, RestoreOutcome, RestoreState,
};
