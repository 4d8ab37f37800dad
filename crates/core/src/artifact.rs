// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Artifact naming shared by the engine and the local artifact store.

use crate::instance::InstanceKey;
use serde::{Deserialize, Serialize};

/// Remote directory every job writes its payload under.
pub const REMOTE_ARTIFACT_ROOT: &str = "/var/vcap/store/bbr-backup";

/// Extension written for new payloads.
pub const TAR_EXTENSION: &str = "tar";

/// Gzip-compressed payloads are accepted on restore.
pub const TGZ_EXTENSION: &str = "tgz";

/// Direction an artifact handle moves data in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Backup,
    Restore,
}

crate::simple_display! {
    ArtifactKind {
        Backup => "backup",
        Restore => "restore",
    }
}

/// `/var/vcap/store/bbr-backup/<logical_name>`
pub fn remote_artifact_dir(logical_name: &str) -> String {
    format!("{}/{}", REMOTE_ARTIFACT_ROOT, logical_name)
}

/// `<group>-<index>-<logical_name>` without extension.
pub fn artifact_stem(instance: &InstanceKey, logical_name: &str) -> String {
    format!("{}-{}", instance.artifact_prefix(), logical_name)
}

/// `<group>-<index>-<logical_name>.tar`
pub fn artifact_file_name(instance: &InstanceKey, logical_name: &str) -> String {
    format!("{}.{}", artifact_stem(instance, logical_name), TAR_EXTENSION)
}
