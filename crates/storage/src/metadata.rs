// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `metadata` document written alongside the payload files.

use crate::checksum::Checksums;
use bbr_core::InstanceKey;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupMetadata {
    #[serde(default)]
    pub instances: Vec<InstanceRecord>,
    #[serde(default)]
    pub custom_artifacts: Vec<CustomArtifactRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_activity: Option<BackupActivity>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRecord {
    /// Instance group
    pub name: String,
    pub index: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub artifacts: Vec<ArtifactRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub name: String,
    #[serde(default)]
    pub checksums: Checksums,
}

/// An artifact named by a job's `backup_name` rather than the job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomArtifactRecord {
    pub name: String,
    pub instance_name: String,
    pub instance_index: String,
    #[serde(default)]
    pub checksums: Checksums,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupActivity {
    pub start_time: String,
    pub finish_time: String,
}

/// Flattened view of one recorded artifact, custom or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtifact {
    pub instance_name: String,
    pub instance_index: String,
    pub name: String,
    pub custom: bool,
    pub checksums: Checksums,
}

impl StoredArtifact {
    /// Payload file name without extension.
    pub fn stem(&self) -> String {
        format!("{}-{}-{}", self.instance_name, self.instance_index, self.name)
    }

    pub fn belongs_to(&self, instance: &InstanceKey) -> bool {
        self.instance_name == instance.group && self.instance_index == instance.index.to_string()
    }
}

impl BackupMetadata {
    pub(crate) fn record(
        &mut self,
        instance: &InstanceKey,
        name: &str,
        custom: bool,
        checksums: Checksums,
    ) {
        let index = instance.index.to_string();
        if custom {
            self.custom_artifacts.retain(|a| {
                !(a.name == name && a.instance_name == instance.group && a.instance_index == index)
            });
            self.custom_artifacts.push(CustomArtifactRecord {
                name: name.to_string(),
                instance_name: instance.group.clone(),
                instance_index: index,
                checksums,
            });
            return;
        }

        let position = self
            .instances
            .iter()
            .position(|i| i.name == instance.group && i.index == index)
            .unwrap_or_else(|| {
                self.instances.push(InstanceRecord {
                    name: instance.group.clone(),
                    index,
                    id: instance.id.clone(),
                    artifacts: Vec::new(),
                });
                self.instances.len() - 1
            });
        let record = &mut self.instances[position];
        record.artifacts.retain(|a| a.name != name);
        record.artifacts.push(ArtifactRecord { name: name.to_string(), checksums });
    }

    /// Every recorded artifact, instance artifacts first.
    pub fn artifacts(&self) -> Vec<StoredArtifact> {
        let instance_artifacts = self.instances.iter().flat_map(|instance| {
            instance.artifacts.iter().map(|a| StoredArtifact {
                instance_name: instance.name.clone(),
                instance_index: instance.index.clone(),
                name: a.name.clone(),
                custom: false,
                checksums: a.checksums.clone(),
            })
        });
        let custom = self.custom_artifacts.iter().map(|a| StoredArtifact {
            instance_name: a.instance_name.clone(),
            instance_index: a.instance_index.clone(),
            name: a.name.clone(),
            custom: true,
            checksums: a.checksums.clone(),
        });
        instance_artifacts.chain(custom).collect()
    }
}
