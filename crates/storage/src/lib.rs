// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Local artifact store: the on-disk side of a backup.
//!
//! ```text
//! <deployment>_<YYYYMMDDTHHMMSSZ>/
//!     <group>-<index>-<artifact>.tar
//!     metadata
//!     manifest.yml
//! ```

mod checksum;
mod error;
mod local;
mod metadata;

pub use checksum::{checksum_archive, Checksums};
pub use error::StoreError;
pub use local::{directory_name, LocalArtifact, MANIFEST_FILE, METADATA_FILE};
pub use metadata::{
    ArtifactRecord, BackupActivity, BackupMetadata, CustomArtifactRecord, InstanceRecord,
    StoredArtifact,
};
