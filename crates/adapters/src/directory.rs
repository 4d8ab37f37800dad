// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deployment directory: which deployments exist, their instances, and how
//! to open a session to each one.

use crate::manifest::{ManifestError, ManifestQuerier, NoopManifest, YamlManifest};
use crate::shell::{LocalShell, RemoteShell, ShellError, SshConfig, SshShell};
use async_trait::async_trait;
use bbr_core::InstanceKey;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid inventory {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("deployment '{0}' not found")]
    UnknownDeployment(String),
    #[error("invalid instance {instance}: {reason}")]
    InvalidInstance { instance: String, reason: String },
    #[error("failed to connect to {instance}: {source}")]
    Connect {
        instance: InstanceKey,
        #[source]
        source: ShellError,
    },
    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// ssh login material shared by every instance of a directory.
#[derive(Debug, Clone)]
pub struct SshCredentials {
    pub username: String,
    pub private_key: Option<PathBuf>,
    pub ssh_bin: String,
    pub control_dir: PathBuf,
}

impl SshCredentials {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            private_key: None,
            ssh_bin: "ssh".to_string(),
            control_dir: std::env::temp_dir(),
        }
    }

    bbr_core::setters! {
        into {
            ssh_bin: String,
            control_dir: PathBuf,
        }
        option {
            private_key: PathBuf,
        }
    }

    fn config(&self, instance: &str, host: &str, port: u16) -> Result<SshConfig, DirectoryError> {
        let private_key =
            self.private_key.clone().ok_or_else(|| DirectoryError::InvalidInstance {
                instance: instance.to_string(),
                reason: "ssh transport requires a private key".to_string(),
            })?;
        Ok(SshConfig::new(host, &self.username, private_key)
            .port(port)
            .ssh_bin(&self.ssh_bin)
            .control_dir(&self.control_dir))
    }
}

/// An open session to one instance.
pub struct InstanceConnection {
    pub key: InstanceKey,
    /// Instance designated to carry backup-one-restore-all jobs for its group
    pub bootstrap: bool,
    pub shell: Arc<dyn RemoteShell>,
}

impl std::fmt::Debug for InstanceConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceConnection")
            .field("key", &self.key)
            .field("bootstrap", &self.bootstrap)
            .finish_non_exhaustive()
    }
}

/// Source of deployments and instance sessions.
#[async_trait]
pub trait DeploymentDirectory: Send + Sync + 'static {
    fn deployment_names(&self) -> Vec<String>;

    /// Open a session to every instance of `deployment`. On failure, every
    /// session already opened is closed before the error is returned.
    async fn connect(&self, deployment: &str) -> Result<Vec<InstanceConnection>, DirectoryError>;

    /// Raw manifest text, when the directory knows it.
    fn manifest(&self, deployment: &str) -> Result<Option<String>, DirectoryError>;

    fn manifest_querier(
        &self,
        deployment: &str,
    ) -> Result<Arc<dyn ManifestQuerier>, DirectoryError> {
        match self.manifest(deployment)? {
            Some(text) => Ok(Arc::new(YamlManifest::parse(&text)?)),
            None => Ok(Arc::new(NoopManifest)),
        }
    }
}

async fn close_all(connections: Vec<InstanceConnection>) {
    for connection in connections {
        if let Err(e) = connection.shell.close().await {
            tracing::warn!(instance = %connection.key, error = %e, "failed to close session");
        }
    }
}

#[derive(Debug, Deserialize)]
struct InventoryDoc {
    #[serde(default)]
    deployments: Vec<DeploymentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct DeploymentEntry {
    name: String,
    #[serde(default)]
    manifest: Option<PathBuf>,
    #[serde(default)]
    instances: Vec<InstanceEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct InstanceEntry {
    group: String,
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    bootstrap: bool,
    #[serde(default)]
    local_root: Option<PathBuf>,
}

impl InstanceEntry {
    fn key(&self) -> InstanceKey {
        let id = self.id.clone().unwrap_or_else(|| self.index.to_string());
        InstanceKey::new(&self.group, self.index, id)
    }

    fn label(&self) -> String {
        format!("{}/{}", self.group, self.index)
    }
}

/// Deployments listed in a YAML inventory file.
#[derive(Debug)]
pub struct Inventory {
    base_dir: PathBuf,
    deployments: Vec<DeploymentEntry>,
    credentials: SshCredentials,
}

impl Inventory {
    pub fn load(path: &Path, credentials: SshCredentials) -> Result<Self, DirectoryError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| DirectoryError::Read { path: path.to_path_buf(), source })?;
        Self::parse(&text, path, credentials)
    }

    /// Parse inventory YAML read from `path`. Relative paths inside it
    /// resolve against the directory containing `path`.
    pub fn parse(
        text: &str,
        path: &Path,
        credentials: SshCredentials,
    ) -> Result<Self, DirectoryError> {
        let doc: InventoryDoc = serde_yaml::from_str(text)
            .map_err(|source| DirectoryError::Parse { path: path.to_path_buf(), source })?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let inventory = Self { base_dir, deployments: doc.deployments, credentials };
        inventory.validate()?;
        Ok(inventory)
    }

    fn validate(&self) -> Result<(), DirectoryError> {
        for deployment in &self.deployments {
            for instance in &deployment.instances {
                let reason = match (&instance.host, &instance.local_root) {
                    (Some(_), Some(_)) => "host and local_root are mutually exclusive",
                    (None, None) => "one of host or local_root is required",
                    _ => continue,
                };
                return Err(DirectoryError::InvalidInstance {
                    instance: format!("{} {}", deployment.name, instance.label()),
                    reason: reason.to_string(),
                });
            }
        }
        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn deployment(&self, name: &str) -> Result<&DeploymentEntry, DirectoryError> {
        self.deployments
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| DirectoryError::UnknownDeployment(name.to_string()))
    }

    async fn open(&self, entry: &InstanceEntry) -> Result<InstanceConnection, DirectoryError> {
        let key = entry.key();
        let shell: Arc<dyn RemoteShell> = match (&entry.host, &entry.local_root) {
            (Some(host), _) => {
                let config =
                    self.credentials.config(&key.to_string(), host, entry.port.unwrap_or(22))?;
                let shell = SshShell::connect(config)
                    .await
                    .map_err(|source| DirectoryError::Connect { instance: key.clone(), source })?;
                Arc::new(shell)
            }
            (None, Some(root)) => {
                Arc::new(LocalShell::new(self.resolve(root), &self.credentials.username))
            }
            (None, None) => {
                return Err(DirectoryError::InvalidInstance {
                    instance: key.to_string(),
                    reason: "one of host or local_root is required".to_string(),
                })
            }
        };
        Ok(InstanceConnection { key, bootstrap: entry.bootstrap, shell })
    }
}

#[async_trait]
impl DeploymentDirectory for Inventory {
    fn deployment_names(&self) -> Vec<String> {
        self.deployments.iter().map(|d| d.name.clone()).collect()
    }

    async fn connect(&self, deployment: &str) -> Result<Vec<InstanceConnection>, DirectoryError> {
        let entry = self.deployment(deployment)?;
        tracing::info!(deployment, instances = entry.instances.len(), "connecting to instances");
        let results =
            futures_util::future::join_all(entry.instances.iter().map(|i| self.open(i))).await;

        let mut connections = Vec::with_capacity(results.len());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(connection) => connections.push(connection),
                Err(e) if first_error.is_none() => first_error = Some(e),
                Err(e) => tracing::warn!(error = %e, "additional connection failure"),
            }
        }
        if let Some(e) = first_error {
            close_all(connections).await;
            return Err(e);
        }
        Ok(connections)
    }

    fn manifest(&self, deployment: &str) -> Result<Option<String>, DirectoryError> {
        let Some(path) = &self.deployment(deployment)?.manifest else {
            return Ok(None);
        };
        let path = self.resolve(path);
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| DirectoryError::Read { path, source })
    }
}

/// A single director VM reached over ssh.
///
/// It appears as one deployment, named after the host unless a name is
/// given, with one instance `bosh/0`.
#[derive(Debug)]
pub struct DirectorHost {
    name: String,
    host: String,
    port: u16,
    credentials: SshCredentials,
}

impl DirectorHost {
    /// `address` is `host` or `host:port`.
    pub fn new(
        address: &str,
        name: Option<String>,
        credentials: SshCredentials,
    ) -> Result<Self, DirectoryError> {
        let (host, port) = match address.rsplit_once(':') {
            Some((host, port)) => {
                let port = port.parse().map_err(|_| DirectoryError::InvalidInstance {
                    instance: address.to_string(),
                    reason: format!("invalid port '{port}'"),
                })?;
                (host.to_string(), port)
            }
            None => (address.to_string(), 22),
        };
        let name = name.unwrap_or_else(|| host.clone());
        Ok(Self { name, host, port, credentials })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn key() -> InstanceKey {
        InstanceKey::new("bosh", 0, "0")
    }
}

#[async_trait]
impl DeploymentDirectory for DirectorHost {
    fn deployment_names(&self) -> Vec<String> {
        vec![self.name.clone()]
    }

    async fn connect(&self, deployment: &str) -> Result<Vec<InstanceConnection>, DirectoryError> {
        if deployment != self.name {
            return Err(DirectoryError::UnknownDeployment(deployment.to_string()));
        }
        let key = Self::key();
        let config = self.credentials.config(&key.to_string(), &self.host, self.port)?;
        let shell = SshShell::connect(config)
            .await
            .map_err(|source| DirectoryError::Connect { instance: key.clone(), source })?;
        Ok(vec![InstanceConnection { key, bootstrap: true, shell: Arc::new(shell) }])
    }

    fn manifest(&self, _deployment: &str) -> Result<Option<String>, DirectoryError> {
        Ok(None)
    }
}

#[cfg(test)]
#[path = "directory_tests.rs"]
mod tests;
