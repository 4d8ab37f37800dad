// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::StoreError;
use bbr_core::TGZ_EXTENSION;
use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// SHA-256 hex digest per file, keyed by path relative to the artifact root.
pub type Checksums = BTreeMap<String, String>;

/// Checksum every regular file inside a `.tar` or `.tgz` payload.
pub fn checksum_archive(path: &Path) -> Result<Checksums, StoreError> {
    let archive_err = |source| StoreError::Archive { path: path.to_path_buf(), source };
    let file = std::fs::File::open(path).map_err(StoreError::io(path))?;
    if path.extension().is_some_and(|ext| ext == TGZ_EXTENSION) {
        checksum_entries(GzDecoder::new(file)).map_err(archive_err)
    } else {
        checksum_entries(file).map_err(archive_err)
    }
}

fn checksum_entries<R: Read>(reader: R) -> std::io::Result<Checksums> {
    let mut archive = tar::Archive::new(reader);
    let mut checksums = Checksums::new();
    for entry in archive.entries()? {
        let mut entry = entry?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path()?.to_string_lossy().into_owned();
        let name = path.strip_prefix("./").unwrap_or(&path).to_string();
        let mut hasher = Sha256::new();
        std::io::copy(&mut entry, &mut hasher)?;
        checksums.insert(name, format!("{:x}", hasher.finalize()));
    }
    Ok(checksums)
}

#[cfg(test)]
#[path = "checksum_tests.rs"]
mod tests;
