// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local artifact directory.

use crate::checksum::{checksum_archive, Checksums};
use crate::error::StoreError;
use crate::metadata::{BackupActivity, BackupMetadata, StoredArtifact};
use bbr_core::{InstanceKey, TAR_EXTENSION, TGZ_EXTENSION};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use parking_lot::Mutex;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::AsyncRead;

pub const METADATA_FILE: &str = "metadata";
pub const MANIFEST_FILE: &str = "manifest.yml";

const DIRECTORY_TIMESTAMP: &str = "%Y%m%dT%H%M%SZ";
const ACTIVITY_TIMESTAMP: &str = "%Y/%m/%d %H:%M:%S UTC";

/// `<deployment>_<YYYYMMDDTHHMMSSZ>`
pub fn directory_name(deployment: &str, at: DateTime<Utc>) -> String {
    format!("{}_{}", deployment, at.format(DIRECTORY_TIMESTAMP))
}

/// One backup on disk. Payload writers for distinct files are independent;
/// the metadata document is held in memory and written by [`save_metadata`].
///
/// [`save_metadata`]: LocalArtifact::save_metadata
#[derive(Debug)]
pub struct LocalArtifact {
    root: PathBuf,
    metadata: Mutex<BackupMetadata>,
}

impl LocalArtifact {
    /// Create a fresh directory for a backup of `deployment` under `parent`.
    pub fn create(parent: &Path, deployment: &str, at: DateTime<Utc>) -> Result<Self, StoreError> {
        std::fs::create_dir_all(parent).map_err(StoreError::io(parent))?;
        let root = parent.join(directory_name(deployment, at));
        match std::fs::create_dir(&root) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(StoreError::AlreadyExists(root));
            }
            Err(e) => return Err(StoreError::Io { path: root, source: e }),
        }
        tracing::info!(path = %root.display(), "created local artifact directory");
        Ok(Self { root, metadata: Mutex::new(BackupMetadata::default()) })
    }

    /// Open an existing backup for restore.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        let path = root.join(METADATA_FILE);
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::MissingMetadata(root.to_path_buf()));
            }
            Err(e) => return Err(StoreError::Io { path, source: e }),
        };
        let metadata = serde_yaml::from_str(&text)?;
        Ok(Self { root: root.to_path_buf(), metadata: Mutex::new(metadata) })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn metadata(&self) -> BackupMetadata {
        self.metadata.lock().clone()
    }

    pub fn artifacts(&self) -> Vec<StoredArtifact> {
        self.metadata.lock().artifacts()
    }

    /// Open `<stem>.tar` for writing. The file must not exist yet.
    pub async fn create_file(&self, stem: &str) -> Result<tokio::fs::File, StoreError> {
        let path = self.root.join(format!("{stem}.{TAR_EXTENSION}"));
        tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(StoreError::io(path))
    }

    /// Path of the payload for `stem`, `.tar` preferred over `.tgz`.
    pub fn locate(&self, stem: &str) -> Result<PathBuf, StoreError> {
        [TAR_EXTENSION, TGZ_EXTENSION]
            .iter()
            .map(|ext| self.root.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file())
            .ok_or_else(|| StoreError::MissingFile {
                dir: self.root.clone(),
                stem: stem.to_string(),
            })
    }

    /// Stream the payload for `stem` as an uncompressed tar.
    pub async fn open_file(
        &self,
        stem: &str,
    ) -> Result<Box<dyn AsyncRead + Send + Unpin>, StoreError> {
        let path = self.locate(stem)?;
        if path.extension().is_some_and(|ext| ext == TAR_EXTENSION) {
            let file = tokio::fs::File::open(&path).await.map_err(StoreError::io(&path))?;
            return Ok(Box::new(file));
        }

        let file = std::fs::File::open(&path).map_err(StoreError::io(&path))?;
        let (reader, writer) = tokio::io::duplex(64 * 1024);
        let mut bridge = tokio_util::io::SyncIoBridge::new(writer);
        tokio::task::spawn_blocking(move || {
            let mut decoder = flate2::read::GzDecoder::new(file);
            let result = std::io::copy(&mut decoder, &mut bridge).and_then(|_| bridge.flush());
            if let Err(e) = result {
                tracing::warn!(path = %path.display(), error = %e, "failed to decompress payload");
            }
        });
        Ok(Box::new(reader))
    }

    /// Checksum the payload for `stem` from its tar entries.
    pub async fn checksum(&self, stem: &str) -> Result<Checksums, StoreError> {
        let path = self.locate(stem)?;
        tokio::task::spawn_blocking(move || checksum_archive(&path)).await?
    }

    pub fn add_checksum(
        &self,
        instance: &InstanceKey,
        name: &str,
        custom: bool,
        checksums: Checksums,
    ) {
        self.metadata.lock().record(instance, name, custom, checksums);
    }

    pub fn set_backup_activity(&self, start: DateTime<Utc>, finish: DateTime<Utc>) {
        self.metadata.lock().backup_activity = Some(BackupActivity {
            start_time: start.format(ACTIVITY_TIMESTAMP).to_string(),
            finish_time: finish.format(ACTIVITY_TIMESTAMP).to_string(),
        });
    }

    pub fn save_manifest(&self, manifest: &str) -> Result<(), StoreError> {
        let path = self.root.join(MANIFEST_FILE);
        std::fs::write(&path, manifest).map_err(StoreError::io(path))
    }

    /// Write the metadata document under an exclusive file lock.
    pub fn save_metadata(&self) -> Result<(), StoreError> {
        let path = self.root.join(METADATA_FILE);
        let file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)
            .map_err(StoreError::io(&path))?;
        file.lock_exclusive().map_err(StoreError::io(&path))?;

        let result = (|| -> Result<(), StoreError> {
            file.set_len(0).map_err(StoreError::io(&path))?;
            let mut writer = std::io::BufWriter::new(&file);
            serde_yaml::to_writer(&mut writer, &*self.metadata.lock())?;
            writer.flush().map_err(StoreError::io(&path))?;
            drop(writer);
            file.sync_all().map_err(StoreError::io(&path))
        })();

        if let Err(e) = FileExt::unlock(&file) {
            tracing::warn!(path = %path.display(), error = %e, "failed to release metadata lock");
        }
        result
    }

    /// Re-read every payload and compare against the recorded checksums.
    ///
    /// Missing payloads, mismatched checksums and unrecorded payload files
    /// all make the artifact invalid.
    pub async fn valid(&self) -> Result<bool, StoreError> {
        let artifacts = self.artifacts();
        let mut expected_files = Vec::with_capacity(artifacts.len());

        for artifact in &artifacts {
            let stem = artifact.stem();
            let path = match self.locate(&stem) {
                Ok(path) => path,
                Err(StoreError::MissingFile { .. }) => {
                    tracing::warn!(artifact = %stem, "payload file missing");
                    return Ok(false);
                }
                Err(e) => return Err(e),
            };
            let actual = self.checksum(&stem).await?;
            if actual != artifact.checksums {
                tracing::warn!(artifact = %stem, "payload checksum does not match metadata");
                return Ok(false);
            }
            expected_files.push(path);
        }

        let entries = std::fs::read_dir(&self.root).map_err(StoreError::io(&self.root))?;
        for entry in entries {
            let path = entry.map_err(StoreError::io(&self.root))?.path();
            let is_payload = path
                .extension()
                .is_some_and(|ext| ext == TAR_EXTENSION || ext == TGZ_EXTENSION);
            if is_payload && !expected_files.contains(&path) {
                tracing::warn!(path = %path.display(), "payload file not recorded in metadata");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
#[path = "local_tests.rs"]
mod tests;
