// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixtures shared by the engine's tests.

use crate::deployment::Deployment;
use crate::instance::Instance;
use bbr_adapters::{FakeShell, Journal, RemoteRunner};
use bbr_core::{InstanceKey, Job};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub(crate) fn tar_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    for (name, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        builder.append_data(&mut header, format!("./{name}"), *data).unwrap();
    }
    builder.into_inner().unwrap()
}

/// `sha256sum` output for the files in `tar`.
pub(crate) fn sha256sum_output(tar: &[u8]) -> String {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.tar");
    std::fs::write(&path, tar).unwrap();
    bbr_storage::checksum_archive(&path)
        .unwrap()
        .iter()
        .map(|(file, sum)| format!("{sum}  ./{file}\n"))
        .collect()
}

/// Fake instances sharing one journal. Every instance starts clean: the
/// remote artifact root does not exist.
pub(crate) struct Fixture {
    pub journal: Journal,
    pub shells: Vec<FakeShell>,
}

impl Fixture {
    pub fn new() -> Self {
        Self { journal: Journal::new(), shells: Vec::new() }
    }

    pub fn instance(&mut self, group: &str, index: u32, jobs: Vec<Job>) -> Instance {
        let shell = FakeShell::new(format!("{group}/{index}")).with_journal(&self.journal);
        shell.on_fail("test -d", "", 1);
        self.shells.push(shell.clone());
        let key = InstanceKey::new(group, index, index.to_string());
        Instance::new(RemoteRunner::new(key, Arc::new(shell)), jobs, false)
    }

    pub fn shell(&self, label: &str) -> &FakeShell {
        self.shells.iter().find(|s| s.label() == label).unwrap()
    }

    pub fn deployment(instances: Vec<Instance>) -> Deployment {
        Deployment::new("redis", instances, CancellationToken::new())
    }
}
