// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sandbox and command helpers shared by the specs.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Run `bbr` with no preset arguments.
pub fn cli() -> CliBuilder {
    CliBuilder { args: Vec::new(), envs: Vec::new() }
}

pub struct CliBuilder {
    args: Vec<String>,
    envs: Vec<(String, String)>,
}

impl CliBuilder {
    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    pub fn env(mut self, key: &str, value: impl AsRef<Path>) -> Self {
        self.envs.push((key.to_string(), value.as_ref().display().to_string()));
        self
    }

    fn output(self) -> RunAssert {
        let mut cmd = assert_cmd::Command::cargo_bin("bbr").unwrap();
        cmd.args(&self.args).env_remove("BBR_LOG").env_remove("BBR_ARTIFACT_ROOT");
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        let output = cmd.output().unwrap();
        RunAssert {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }

    pub fn passes(self) -> RunAssert {
        self.exits(0)
    }

    pub fn fails(self) -> RunAssert {
        let run = self.output();
        assert_ne!(run.code, Some(0), "expected failure\n{run}");
        run
    }

    pub fn exits(self, code: i32) -> RunAssert {
        let run = self.output();
        assert_eq!(run.code, Some(code), "unexpected exit code\n{run}");
        run
    }
}

pub struct RunAssert {
    code: Option<i32>,
    stdout: String,
    stderr: String,
}

impl RunAssert {
    pub fn stdout_has(self, needle: &str) -> Self {
        assert!(self.stdout.contains(needle), "stdout lacks {needle:?}\n{self}");
        self
    }

    pub fn stderr_has(self, needle: &str) -> Self {
        assert!(self.stderr.contains(needle), "stderr lacks {needle:?}\n{self}");
        self
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }
}

impl std::fmt::Display for RunAssert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exit: {:?}\n--- stdout\n{}\n--- stderr\n{}", self.code, self.stdout, self.stderr)
    }
}

/// Temp directory holding local instances, an inventory and the artifacts.
///
/// Every hook script appends `<instance> <job> <script>` to `calls.log`
/// before running its body; metadata scripts do not.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        let sandbox = Self { dir: TempDir::new().unwrap() };
        std::fs::create_dir_all(sandbox.artifact_root()).unwrap();
        sandbox
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn artifact_root(&self) -> PathBuf {
        self.path().join("artifacts")
    }

    pub fn file(&self, relative: &str, contents: &str) -> &Self {
        let path = self.path().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
        self
    }

    pub fn read(&self, relative: &str) -> String {
        std::fs::read_to_string(self.path().join(relative)).unwrap()
    }

    /// Root of the local instance `name`.
    pub fn instance(&self, name: &str) -> PathBuf {
        self.path().join("instances").join(name)
    }

    /// Install `/var/vcap/jobs/<job>/bin/bbr/<script>` on an instance.
    pub fn script(&self, instance: &str, job: &str, script: &str, body: &str) -> &Self {
        let relative = format!("instances/{instance}/var/vcap/jobs/{job}/bin/bbr/{script}");
        let log = if script == "metadata" {
            String::new()
        } else {
            format!("echo '{instance} {job} {script}' >> {}\n", self.calls_log().display())
        };
        self.file(&relative, &format!("#!/usr/bin/env bash\nset -eu\n{log}{body}"));
        let path = self.path().join(relative);
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        self
    }

    /// Backup and restore scripts that copy `<instance>/data` in and out of
    /// the artifact directory.
    pub fn data_job(&self, instance: &str, job: &str) -> &Self {
        let data = self.instance(instance).join("data").join(job);
        let data = data.display();
        let backup = format!("cp -a {data}/. \"$BBR_ARTIFACT_DIRECTORY\"\n");
        let restore =
            format!("rm -rf {data}\nmkdir -p {data}\ncp -a \"$ARTIFACT_DIRECTORY\". {data}/\n");
        self.script(instance, job, "backup", &backup).script(instance, job, "restore", &restore)
    }

    /// Write a file under a job's data directory.
    pub fn data(&self, instance: &str, job: &str, file: &str, contents: &str) -> &Self {
        self.file(&format!("instances/{instance}/data/{job}/{file}"), contents)
    }

    pub fn read_data(&self, instance: &str, job: &str, file: &str) -> String {
        self.read(&format!("instances/{instance}/data/{job}/{file}"))
    }

    fn calls_log(&self) -> PathBuf {
        self.path().join("calls.log")
    }

    /// Hook invocations so far, in order.
    pub fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.calls_log())
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Write an inventory holding one deployment. Instances are
    /// `(group, index, instance dir name)`.
    pub fn inventory(&self, deployment: &str, instances: &[(&str, u32, &str)]) -> &Self {
        self.inventory_of(&[(deployment, instances)])
    }

    /// Like [`inventory`](Self::inventory), with `manifest` saved beside it
    /// as the deployment's manifest.
    pub fn inventory_with_manifest(
        &self,
        deployment: &str,
        instances: &[(&str, u32, &str)],
        manifest: &str,
    ) -> &Self {
        self.file("manifest.yml", manifest);
        self.write_inventory(&[(deployment, instances)], Some("manifest.yml"))
    }

    pub fn inventory_of(&self, deployments: &[(&str, &[(&str, u32, &str)])]) -> &Self {
        self.write_inventory(deployments, None)
    }

    fn write_inventory(
        &self,
        deployments: &[(&str, &[(&str, u32, &str)])],
        manifest: Option<&str>,
    ) -> &Self {
        let mut yaml = String::from("deployments:\n");
        for (name, instances) in deployments {
            yaml.push_str(&format!("  - name: {name}\n"));
            if let Some(manifest) = manifest {
                yaml.push_str(&format!("    manifest: {manifest}\n"));
            }
            yaml.push_str("    instances:\n");
            for (group, index, dir) in *instances {
                yaml.push_str(&format!(
                    "      - group: {group}\n        index: {index}\n        \
                     local_root: instances/{dir}\n"
                ));
            }
        }
        self.file("inventory.yml", &yaml)
    }

    /// `bbr deployment` against this sandbox's inventory.
    pub fn bbr(&self, deployment: &str) -> CliBuilder {
        self.bbr_target().args(&["--deployment", deployment])
    }

    /// `bbr deployment --target ... --username vcap` without a deployment.
    pub fn bbr_target(&self) -> CliBuilder {
        let inventory = self.path().join("inventory.yml");
        cli()
            .args(&["deployment", "--target", &inventory.display().to_string()])
            .args(&["--username", "vcap"])
            .env("BBR_ARTIFACT_ROOT", self.artifact_root())
    }

    /// Artifact directories written so far.
    pub fn artifacts(&self) -> Vec<PathBuf> {
        let mut found: Vec<PathBuf> = std::fs::read_dir(self.artifact_root())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        found.sort();
        found
    }

    /// The only artifact directory written so far.
    pub fn artifact(&self) -> PathBuf {
        let artifacts = self.artifacts();
        assert_eq!(artifacts.len(), 1, "{artifacts:?}");
        artifacts.into_iter().next().unwrap()
    }

    pub fn remote_artifact_root(&self, instance: &str) -> PathBuf {
        self.instance(instance).join("var/vcap/store/bbr-backup")
    }
}
