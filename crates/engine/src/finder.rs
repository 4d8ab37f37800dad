// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job discovery on one instance.

use crate::error::Error;
use bbr_adapters::{ManifestQuerier, RemoteRunner};
use bbr_core::{Job, Metadata, Script, ScriptKind, SCRIPT_GLOB};
use std::collections::BTreeMap;

/// Discover every job with hook scripts on the runner's instance.
///
/// Jobs are returned in name order. Any metadata failure or unresolvable
/// release fails discovery for the whole instance.
pub async fn find_jobs(
    runner: &RemoteRunner,
    manifest: &dyn ManifestQuerier,
) -> Result<Vec<Job>, Error> {
    let instance = runner.instance().clone();
    let files = runner.find_files(SCRIPT_GLOB).await?;

    let mut by_job: BTreeMap<String, Vec<Script>> = BTreeMap::new();
    for script in files.iter().filter_map(|path| Script::parse(path)) {
        by_job.entry(script.job_name().to_string()).or_default().push(script);
    }

    let mut jobs = Vec::with_capacity(by_job.len());
    for (name, scripts) in by_job {
        let metadata = match scripts.iter().find(|s| s.kind() == ScriptKind::Metadata) {
            Some(script) => {
                let stdout = runner.run_script(script).await.map_err(|source| Error::Script {
                    instance: instance.clone(),
                    job: name.clone(),
                    kind: ScriptKind::Metadata,
                    source,
                })?;
                Metadata::parse(&stdout).map_err(|source| Error::Metadata {
                    instance: instance.clone(),
                    job: name.clone(),
                    source,
                })?
            }
            None => Metadata::default(),
        };

        let release = manifest
            .find_release_name(&instance.group, &name)
            .map_err(|source| Error::Release { instance: instance.clone(), source })?;
        let backup_one_restore_all = manifest.is_job_backup_one_restore_all(&instance.group, &name);

        tracing::debug!(
            instance = %instance,
            job = %name,
            release = %release,
            scripts = ?scripts.iter().map(Script::name).collect::<Vec<_>>(),
            skipped = metadata.skip_bbr_scripts,
            "discovered job"
        );
        jobs.push(Job::new(name, release, &scripts, metadata, backup_one_restore_all));
    }
    Ok(jobs)
}

#[cfg(test)]
#[path = "finder_tests.rs"]
mod tests;
