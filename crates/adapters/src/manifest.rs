// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment manifest queries: job release names and the
//! backup-one-restore-all property.

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse deployment manifest: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("release not found for job '{job}' in instance group '{group}'")]
    ReleaseNotFound { group: String, job: String },
}

/// Answers questions about a deployment's manifest.
pub trait ManifestQuerier: Send + Sync + 'static {
    fn find_release_name(&self, group: &str, job: &str) -> Result<String, ManifestError>;

    fn is_job_backup_one_restore_all(&self, group: &str, job: &str) -> bool;
}

/// Querier for deployments without a manifest. Every job resolves to an
/// empty release name and no job is backup-one-restore-all.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopManifest;

impl ManifestQuerier for NoopManifest {
    fn find_release_name(&self, _group: &str, _job: &str) -> Result<String, ManifestError> {
        Ok(String::new())
    }

    fn is_job_backup_one_restore_all(&self, _group: &str, _job: &str) -> bool {
        false
    }
}

#[derive(Debug, Default, Deserialize)]
struct ManifestDoc {
    #[serde(default)]
    instance_groups: Vec<InstanceGroupDoc>,
}

#[derive(Debug, Deserialize)]
struct InstanceGroupDoc {
    name: String,
    #[serde(default)]
    jobs: Vec<JobDoc>,
}

#[derive(Debug, Deserialize)]
struct JobDoc {
    name: String,
    release: String,
    #[serde(default)]
    properties: JobProperties,
}

#[derive(Debug, Default, Deserialize)]
struct JobProperties {
    #[serde(default)]
    bbr: BbrProperties,
}

#[derive(Debug, Default, Deserialize)]
struct BbrProperties {
    #[serde(default)]
    backup_one_restore_all: bool,
}

/// Querier over a parsed deployment manifest.
#[derive(Debug)]
pub struct YamlManifest {
    doc: ManifestDoc,
}

impl YamlManifest {
    pub fn parse(yaml: &str) -> Result<Self, ManifestError> {
        let doc = if yaml.trim().is_empty() {
            ManifestDoc::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        Ok(Self { doc })
    }

    fn job(&self, group: &str, job: &str) -> Option<&JobDoc> {
        self.doc
            .instance_groups
            .iter()
            .filter(|g| g.name == group)
            .flat_map(|g| g.jobs.iter())
            .find(|j| j.name == job)
    }
}

impl ManifestQuerier for YamlManifest {
    fn find_release_name(&self, group: &str, job: &str) -> Result<String, ManifestError> {
        self.job(group, job).map(|j| j.release.clone()).ok_or_else(|| {
            ManifestError::ReleaseNotFound { group: group.to_string(), job: job.to_string() }
        })
    }

    fn is_job_backup_one_restore_all(&self, group: &str, job: &str) -> bool {
        self.job(group, job).is_some_and(|j| j.properties.bbr.backup_one_restore_all)
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
