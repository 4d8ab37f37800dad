// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Discovery: turn a deployment name into a connected [`Deployment`].

use crate::deployment::Deployment;
use crate::error::Error;
use crate::finder::find_jobs;
use crate::instance::Instance;
use bbr_adapters::{DeploymentDirectory, RemoteRunner};
use futures_util::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct DeploymentManager {
    directory: Arc<dyn DeploymentDirectory>,
}

impl DeploymentManager {
    pub fn new(directory: Arc<dyn DeploymentDirectory>) -> Self {
        Self { directory }
    }

    pub fn deployment_names(&self) -> Vec<String> {
        self.directory.deployment_names()
    }

    pub fn manifest(&self, deployment: &str) -> Result<Option<String>, Error> {
        Ok(self.directory.manifest(deployment)?)
    }

    /// Connect to every instance of `name` and discover its jobs. Sessions
    /// are closed again when discovery fails.
    pub async fn find(&self, name: &str, cancel: CancellationToken) -> Result<Deployment, Error> {
        tracing::info!(deployment = name, "discovering jobs");
        let connections = self.directory.connect(name).await?;
        let runners: Vec<(RemoteRunner, bool)> = connections
            .into_iter()
            .map(|c| (RemoteRunner::new(c.key, c.shell), c.bootstrap))
            .collect();

        let querier = match self.directory.manifest_querier(name) {
            Ok(querier) => querier,
            Err(e) => {
                teardown(runners.iter().map(|(runner, _)| runner)).await;
                return Err(e.into());
            }
        };

        let found =
            join_all(runners.iter().map(|(runner, _)| find_jobs(runner, querier.as_ref()))).await;
        let mut instances = Vec::with_capacity(runners.len());
        let mut errors = Vec::new();
        for ((runner, bootstrap), jobs) in runners.iter().zip(found) {
            match jobs {
                Ok(jobs) => instances.push(Instance::new(runner.clone(), jobs, *bootstrap)),
                Err(e) => errors.push(e),
            }
        }

        let mut errors = errors.into_iter();
        if let Some(first) = errors.next() {
            for other in errors {
                tracing::error!(deployment = name, error = %other, "discovery failed");
            }
            teardown(runners.iter().map(|(runner, _)| runner)).await;
            return Err(first);
        }

        let deployment = Deployment::new(name, instances, cancel);
        tracing::info!(
            deployment = name,
            instances = deployment.instances().len(),
            jobs = deployment.jobs().len(),
            "discovered deployment"
        );
        Ok(deployment)
    }
}

async fn teardown<'a>(runners: impl Iterator<Item = &'a RemoteRunner>) {
    for runner in runners {
        if let Err(e) = runner.teardown().await {
            tracing::warn!(instance = %runner.instance(), error = %e, "failed to close session");
        }
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
