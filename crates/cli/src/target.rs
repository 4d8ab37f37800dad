// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolve command line targets into a deployment manager and the
//! deployments to operate on.

use crate::commands::Command;
use crate::{env, Target};
use anyhow::{bail, Context, Result};
use bbr_adapters::{DeploymentDirectory, DirectorHost, Inventory, SshCredentials};
use bbr_engine::DeploymentManager;
use std::sync::Arc;

pub struct Selection {
    pub manager: DeploymentManager,
    pub deployments: Vec<String>,
    pub all: bool,
    pub command: Command,
}

fn credentials(username: &str) -> SshCredentials {
    SshCredentials::new(username).ssh_bin(env::ssh_bin()).control_dir(env::ssh_control_dir())
}

pub fn select(target: Target) -> Result<Selection> {
    match target {
        Target::Deployment(args) => {
            if args.password.is_some() || args.ca_cert.is_some() {
                tracing::debug!("--password and --ca-cert are not used by inventory targets");
            }
            let mut credentials = credentials(&args.username);
            if let Some(key) = args.private_key_path {
                credentials = credentials.private_key(key);
            }
            let inventory = Inventory::load(&args.target, credentials)
                .with_context(|| format!("cannot load inventory {}", args.target.display()))?;

            let deployments = match args.deployment {
                Some(name) => vec![name],
                None => inventory.deployment_names(),
            };
            if args.all_deployments {
                if deployments.is_empty() {
                    bail!("inventory {} lists no deployments", args.target.display());
                }
                if matches!(args.command, Command::Restore { .. }) {
                    bail!("restore cannot be used with --all-deployments");
                }
            }
            Ok(Selection {
                manager: DeploymentManager::new(Arc::new(inventory)),
                deployments,
                all: args.all_deployments,
                command: args.command,
            })
        }
        Target::Director(args) => {
            let credentials = credentials(&args.username).private_key(args.private_key_path);
            let director = DirectorHost::new(&args.host, args.name, credentials)?;
            let name = director.name().to_string();
            Ok(Selection {
                manager: DeploymentManager::new(Arc::new(director)),
                deployments: vec![name],
                all: false,
                command: args.command,
            })
        }
    }
}
