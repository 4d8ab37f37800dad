// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;
use thiserror::Error;

/// Errors from the local artifact store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("artifact directory already exists: {0}")]
    AlreadyExists(PathBuf),
    #[error("no metadata file in {0}")]
    MissingMetadata(PathBuf),
    #[error("invalid metadata: {0}")]
    Metadata(#[from] serde_yaml::Error),
    #[error("no payload file for '{stem}' in {dir}")]
    MissingFile { dir: PathBuf, stem: String },
    #[error("failed to read archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::Io { path, source }
    }
}
