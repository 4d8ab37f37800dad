// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job metadata reported by a job's `metadata` script.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing metadata script output
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("invalid metadata yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("{field} entry {position} is missing job_name or release")]
    IncompleteLockBefore { field: &'static str, position: usize },
}

/// A `{job_name, release}` pair naming a job that must be locked after the
/// job declaring it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LockBefore {
    #[serde(default)]
    pub job_name: String,
    #[serde(default)]
    pub release: String,
}

impl LockBefore {
    pub fn new(job_name: impl Into<String>, release: impl Into<String>) -> Self {
        Self { job_name: job_name.into(), release: release.into() }
    }
}

/// Parsed output of `/var/vcap/jobs/<JOB>/bin/bbr/metadata`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_name: Option<String>,
    #[serde(default)]
    pub skip_bbr_scripts: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub backup_should_be_locked_before: Vec<LockBefore>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub restore_should_be_locked_before: Vec<LockBefore>,
}

impl Metadata {
    /// Parse metadata script stdout. Blank output is an empty record.
    pub fn parse(raw: &str) -> Result<Self, MetadataError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let metadata: Metadata = serde_yaml::from_str(raw)?;
        metadata.validate()?;
        Ok(metadata)
    }

    fn validate(&self) -> Result<(), MetadataError> {
        let lists = [
            ("backup_should_be_locked_before", &self.backup_should_be_locked_before),
            ("restore_should_be_locked_before", &self.restore_should_be_locked_before),
        ];
        for (field, list) in lists {
            if let Some(position) =
                list.iter().position(|lb| lb.job_name.is_empty() || lb.release.is_empty())
            {
                return Err(MetadataError::IncompleteLockBefore { field, position });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "metadata_tests.rs"]
mod tests;
