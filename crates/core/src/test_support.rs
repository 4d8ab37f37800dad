// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{Job, LockBefore, Metadata, Script, ScriptKind};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for lock-graph shaped job sets.
pub mod strategies {
    use super::lock_job;
    use crate::{Job, LockBefore};
    use proptest::prelude::*;

    /// Between 1 and `max` jobs whose `backup_should_be_locked_before` edges
    /// only point at later jobs, so the graph is always acyclic.
    pub fn arb_acyclic_jobs(max: usize) -> impl Strategy<Value = Vec<Job>> {
        (1..=max)
            .prop_flat_map(|n| {
                let edges = proptest::collection::vec(any::<bool>(), n * n);
                (Just(n), edges, proptest::collection::vec(0..3u8, n))
            })
            .prop_map(|(n, edges, releases)| {
                (0..n)
                    .map(|i| {
                        let before = ((i + 1)..n)
                            .filter(|j| edges[i * n + j])
                            .map(|j| LockBefore::new(format!("job-{j}"), release_name(releases[j])))
                            .collect();
                        lock_job(&format!("job-{i}"), &release_name(releases[i]), before)
                    })
                    .collect()
            })
    }

    fn release_name(r: u8) -> String {
        format!("release-{r}")
    }
}

// ── Job factory functions ─────────────────────────────────────────────────

/// A job with lock/unlock/backup/restore scripts and the given backup lock edges.
pub fn lock_job(name: &str, release: &str, before: Vec<LockBefore>) -> Job {
    let scripts: Vec<Script> = [
        ScriptKind::Backup,
        ScriptKind::Restore,
        ScriptKind::PreBackupLock,
        ScriptKind::PostBackupUnlock,
    ]
    .into_iter()
    .map(|kind| Script::for_job(name, kind))
    .collect();
    let metadata = Metadata {
        backup_should_be_locked_before: before.clone(),
        restore_should_be_locked_before: before,
        ..Metadata::default()
    };
    Job::new(name, release, &scripts, metadata, false)
}

/// A job with only the given script kinds and empty metadata.
pub fn job_with(name: &str, release: &str, kinds: &[ScriptKind]) -> Job {
    let scripts: Vec<Script> = kinds.iter().map(|k| Script::for_job(name, *k)).collect();
    Job::new(name, release, &scripts, Metadata::default(), false)
}
