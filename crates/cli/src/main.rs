// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! bbr: back up and restore deployments

mod commands;
mod env;
mod exit_error;
mod logging;
mod target;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::Command;
use exit_error::ExitError;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "bbr", version, about = "Back up and restore deployments")]
struct Cli {
    /// Log at debug level (overrides BBR_LOG)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    target: Target,
}

#[derive(Subcommand)]
enum Target {
    /// Deployments listed in an inventory file
    Deployment(DeploymentArgs),
    /// A single director VM reached over ssh
    Director(DirectorArgs),
}

#[derive(Args)]
struct DeploymentArgs {
    /// Inventory file listing deployments and their instances
    #[arg(long, value_name = "INVENTORY")]
    target: PathBuf,

    /// ssh user on the instances
    #[arg(long)]
    username: String,

    /// Accepted for compatibility; not used by inventory targets
    #[arg(long, hide = true)]
    password: Option<String>,

    /// Accepted for compatibility; not used by inventory targets
    #[arg(long = "ca-cert", hide = true)]
    ca_cert: Option<PathBuf>,

    /// Private key for instances reached over ssh
    #[arg(long = "private-key-path")]
    private_key_path: Option<PathBuf>,

    /// Deployment to operate on
    #[arg(long, required_unless_present = "all_deployments")]
    deployment: Option<String>,

    /// Operate on every deployment in the inventory
    #[arg(long = "all-deployments", conflicts_with = "deployment")]
    all_deployments: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DirectorArgs {
    /// Director address, `host` or `host:port`
    #[arg(long)]
    host: String,

    /// ssh user on the director
    #[arg(long)]
    username: String,

    /// Private key for the ssh user
    #[arg(long = "private-key-path")]
    private_key_path: PathBuf,

    /// Name used for the artifact directory (default: the host)
    #[arg(long)]
    name: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.debug);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, stopping after the current step");
            interrupt.cancel();
        }
    });

    let code = match run(cli.target, cancel).await {
        Ok(()) => 0,
        Err(e) => match e.downcast_ref::<ExitError>() {
            Some(exit) => {
                if let Some(summary) = &exit.summary {
                    eprintln!("{summary}");
                }
                exit.code
            }
            None => {
                eprintln!("error: {e:#}");
                1
            }
        },
    };
    std::process::exit(code);
}

async fn run(target: Target, cancel: CancellationToken) -> Result<()> {
    let selection = target::select(target)?;
    commands::execute(&selection, cancel).await
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
