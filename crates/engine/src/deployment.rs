// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment-wide phases.
//!
//! Lock and unlock walk the lock order one script at a time across the
//! whole deployment. Backup, drain, upload and cleanup fan out one future
//! per instance and join at the end of the phase.

use crate::artifact::resolve_restore_artifact;
use crate::error::Error;
use crate::instance::Instance;
use crate::orderer::lock_order;
use bbr_core::{ArtifactKind, Job, JobIdentity};
use bbr_storage::{LocalArtifact, StoredArtifact};
use futures_util::future::join_all;
use std::collections::{BTreeMap, BTreeSet};
use tokio_util::sync::CancellationToken;

pub struct Deployment {
    name: String,
    instances: Vec<Instance>,
    cancel: CancellationToken,
}

/// One lock or unlock invocation: a job identity on one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LockStep {
    instance: usize,
    job: JobIdentity,
}

impl Deployment {
    /// Instances are ordered by group and index. In each group the first
    /// instance flagged bootstrap keeps the flag; without one, the lowest
    /// index becomes bootstrap.
    pub fn new(
        name: impl Into<String>,
        mut instances: Vec<Instance>,
        cancel: CancellationToken,
    ) -> Self {
        instances.sort_by(|a, b| a.key().cmp(b.key()));

        let mut chosen: BTreeMap<String, usize> = BTreeMap::new();
        for (position, instance) in instances.iter().enumerate() {
            if instance.is_bootstrap() {
                chosen.entry(instance.key().group.clone()).or_insert(position);
            }
        }
        for (position, instance) in instances.iter().enumerate() {
            chosen.entry(instance.key().group.clone()).or_insert(position);
        }
        for (position, instance) in instances.iter_mut().enumerate() {
            let bootstrap = chosen.get(&instance.key().group) == Some(&position);
            instance.set_bootstrap(bootstrap);
        }

        Self { name: name.into(), instances, cancel }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.instances.iter().flat_map(|i| i.jobs().iter().cloned()).collect()
    }

    pub fn is_backupable(&self) -> bool {
        self.instances.iter().any(Instance::is_backupable)
    }

    pub fn is_restorable(&self) -> bool {
        self.instances.iter().any(Instance::is_restorable)
    }

    /// One error per custom backup name claimed by more than one job, and
    /// one per instance where a custom name lands on another job's default
    /// artifact directory.
    pub fn custom_artifact_name_conflicts(&self) -> Vec<Error> {
        let mut claims: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for job in self.instances.iter().flat_map(|i| i.backup_jobs()) {
            if job.has_backup_artifact_name() {
                claims.entry(job.backup_artifact_name()).or_default().insert(job.name());
            }
        }
        let mut errors: Vec<Error> = claims
            .into_iter()
            .filter(|(_, jobs)| jobs.len() > 1)
            .map(|(name, jobs)| Error::DuplicateCustomName {
                deployment: self.name.clone(),
                name: name.to_string(),
                jobs: jobs.into_iter().map(str::to_string).collect(),
            })
            .collect();
        for instance in &self.instances {
            errors.extend(shared_artifact_names(instance));
        }
        errors
    }

    pub fn has_unique_custom_artifact_names(&self) -> bool {
        self.custom_artifact_name_conflicts().is_empty()
    }

    /// Errors for every instance that still holds an artifact directory.
    pub async fn check_artifact_dir(&self) -> Vec<Error> {
        join_all(self.instances.iter().map(Instance::check_artifact_dir))
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect()
    }

    pub fn lock_order(&self, kind: ArtifactKind) -> Result<Vec<JobIdentity>, Error> {
        lock_order(&self.jobs(), kind)
    }

    fn lock_plan(&self, order: &[JobIdentity], has_script: fn(&Job) -> bool) -> Vec<LockStep> {
        let mut plan = Vec::new();
        for identity in order {
            for (position, instance) in self.instances.iter().enumerate() {
                if instance.jobs().iter().any(|j| j.identity() == *identity && has_script(j)) {
                    plan.push(LockStep { instance: position, job: identity.clone() });
                }
            }
        }
        plan
    }

    /// Lock jobs in lock order, stopping at the first failure. Locks already
    /// taken are left for [`post_backup_unlock`](Self::post_backup_unlock).
    pub async fn pre_backup_lock(&self) -> Vec<Error> {
        let order = match self.lock_order(ArtifactKind::Backup) {
            Ok(order) => order,
            Err(e) => return vec![e],
        };
        for step in self.lock_plan(&order, Job::has_pre_backup_lock) {
            if self.cancel.is_cancelled() {
                return vec![Error::Cancelled];
            }
            let errors = self.instances[step.instance].pre_backup_lock(&step.job).await;
            if !errors.is_empty() {
                return errors;
            }
        }
        Vec::new()
    }

    /// Unlock in exact reverse lock order. Every step runs regardless of
    /// failures or cancellation.
    pub async fn post_backup_unlock(&self) -> Vec<Error> {
        let order = match self.lock_order(ArtifactKind::Backup) {
            Ok(order) => order,
            // nothing can have been locked without an order
            Err(_) => return Vec::new(),
        };
        let mut errors = Vec::new();
        for step in self.lock_plan(&order, Job::has_post_backup_unlock).into_iter().rev() {
            errors.extend(self.instances[step.instance].post_backup_unlock(&step.job).await);
        }
        errors
    }

    pub async fn backup(&mut self) -> Vec<Error> {
        let cancel = &self.cancel;
        join_all(
            self.instances
                .iter_mut()
                .filter(|instance| instance.is_backupable())
                .map(|instance| instance.backup(cancel)),
        )
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    pub async fn copy_remote_backups_to_local_artifact(&self, store: &LocalArtifact) -> Vec<Error> {
        join_all(self.instances.iter().map(|instance| instance.drain_to(store, &self.cancel)))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    pub async fn copy_local_backup_to_remote(&mut self, store: &LocalArtifact) -> Vec<Error> {
        let cancel = &self.cancel;
        join_all(
            self.instances
                .iter_mut()
                .filter(|instance| instance.is_restorable())
                .map(|instance| instance.upload_from(store, cancel)),
        )
        .await
        .into_iter()
        .flatten()
        .collect()
    }

    /// Run restore scripts one at a time in restore lock order.
    pub async fn restore(&self) -> Vec<Error> {
        let order = match self.lock_order(ArtifactKind::Restore) {
            Ok(order) => order,
            Err(e) => return vec![e],
        };
        let mut errors = Vec::new();
        for identity in &order {
            for instance in &self.instances {
                errors.extend(instance.restore(identity, &self.cancel).await);
            }
        }
        errors
    }

    /// Every live restore job must have a recorded artifact, and every
    /// recorded artifact must belong to a live job.
    pub fn validate_is_restorable(&self, recorded: &[StoredArtifact]) -> Vec<Error> {
        let mut errors = Vec::new();
        for instance in &self.instances {
            for job in instance.restore_jobs() {
                if let Err(e) = resolve_restore_artifact(recorded, instance.key(), job) {
                    errors.push(e);
                }
            }
        }
        for artifact in recorded.iter().filter(|a| !self.claims(a)) {
            errors.push(Error::UnmatchedArtifact {
                deployment: self.name.clone(),
                artifact: artifact.stem(),
            });
        }
        errors
    }

    fn claims(&self, artifact: &StoredArtifact) -> bool {
        self.instances.iter().any(|instance| {
            instance.jobs().iter().any(|job| {
                if artifact.custom {
                    let restores = job.has_restore_artifact_name()
                        && job.restore_artifact_name() == artifact.name;
                    let backs_up = job.has_backup_artifact_name()
                        && job.backup_artifact_name() == artifact.name;
                    restores || backs_up
                } else {
                    job.name() == artifact.name
                        && (artifact.belongs_to(instance.key())
                            || (job.backup_one_restore_all()
                                && artifact.instance_name == instance.key().group))
                }
            })
        })
    }

    pub async fn cleanup(&mut self) -> Vec<Error> {
        join_all(self.instances.iter_mut().map(Instance::cleanup))
            .await
            .into_iter()
            .flatten()
            .collect()
    }

    pub async fn cleanup_previous(&mut self) -> Vec<Error> {
        join_all(self.instances.iter_mut().map(Instance::cleanup_previous))
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Backup jobs on one instance whose artifact directories coincide because a
/// custom name matches another job's default name.
fn shared_artifact_names(instance: &Instance) -> Vec<Error> {
    let mut dirs: BTreeMap<&str, Vec<&Job>> = BTreeMap::new();
    for job in instance.backup_jobs() {
        dirs.entry(job.backup_artifact_name()).or_default().push(job);
    }
    dirs.into_iter()
        .filter(|(_, jobs)| jobs.len() > 1 && jobs.iter().any(|j| !j.has_backup_artifact_name()))
        .map(|(name, jobs)| Error::SharedArtifactName {
            instance: instance.key().clone(),
            name: name.to_string(),
            jobs: jobs.iter().map(|j| j.name().to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
#[path = "deployment_tests.rs"]
mod tests;
