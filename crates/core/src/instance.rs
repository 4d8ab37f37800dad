// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Instance identity.

use serde::{Deserialize, Serialize};

/// Identifies one VM within a deployment.
///
/// Ordering is by instance group, then index, so deployment-wide iteration
/// is stable across runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceKey {
    pub group: String,
    pub index: u32,
    pub id: String,
}

impl InstanceKey {
    pub fn new(group: impl Into<String>, index: u32, id: impl Into<String>) -> Self {
        Self { group: group.into(), index, id: id.into() }
    }

    /// `<group>-<index>`, the prefix of every artifact file from this instance.
    pub fn artifact_prefix(&self) -> String {
        format!("{}-{}", self.group, self.index)
    }
}

/// `<group>/<id>`, the form used in every log line and error.
impl std::fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.group, self.id)
    }
}
