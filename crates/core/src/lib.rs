// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bbr-core: data model shared by the backup and restore orchestrator

pub mod macros;

pub mod artifact;
pub mod instance;
pub mod job;
pub mod metadata;
pub mod script;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use artifact::{
    artifact_file_name, artifact_stem, remote_artifact_dir, ArtifactKind, REMOTE_ARTIFACT_ROOT,
    TAR_EXTENSION, TGZ_EXTENSION,
};
pub use instance::InstanceKey;
#[cfg(any(test, feature = "test-support"))]
pub use job::JobBuilder;
pub use job::{Job, JobIdentity};
pub use metadata::{LockBefore, Metadata, MetadataError};
pub use script::{Script, ScriptKind, SCRIPT_GLOB};
