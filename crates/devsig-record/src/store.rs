//! # Signature Store
//!
//! A directory of immutable per-device artifacts named
//! `EUI-64_{16 uppercase hex}.bin`. Each file holds exactly the bytes written
//! to one device. Files are created read-only and atomically; an existing
//! artifact is never replaced unless the caller explicitly asks for it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use devsig_core::{Eui64, StagedFile, READ_ONLY_MODE, WORKING_COPY_MODE};

use crate::error::StoreError;

/// Directory of per-device signature artifacts.
#[derive(Debug, Clone)]
pub struct SignatureStore {
    dir: PathBuf,
}

impl SignatureStore {
    /// Store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The store directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the artifact for `eui` lives.
    pub fn path_for(&self, eui: Eui64) -> PathBuf {
        self.dir.join(eui.artifact_filename())
    }

    /// Fail if an artifact for `eui` already exists.
    ///
    /// Used before allocating an identifier so that a stale ledger cannot
    /// silently produce a second device with the same identity.
    pub fn check_available(&self, eui: Eui64) -> Result<(), StoreError> {
        let path = self.path_for(eui);
        match fs::symlink_metadata(&path) {
            Ok(_) => Err(StoreError::DuplicateIdentifier { eui, path }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    /// Write the artifact for `eui` and return its path.
    ///
    /// The file is fully written under a temporary name, set read-only, and
    /// moved into place. Without `overwrite` the move refuses to replace an
    /// existing file.
    ///
    /// # Errors
    ///
    /// - [`StoreError::DuplicateIdentifier`] if the artifact exists and
    ///   `overwrite` is false.
    /// - [`StoreError::Io`] on any filesystem failure.
    pub fn store(&self, eui: Eui64, bytes: &[u8], overwrite: bool) -> Result<PathBuf, StoreError> {
        fs::create_dir_all(&self.dir).map_err(StoreError::io(&self.dir))?;
        let path = self.path_for(eui);

        let staged =
            StagedFile::stage(&path, bytes, Some(READ_ONLY_MODE)).map_err(StoreError::io(&path))?;
        let committed = if overwrite {
            staged.commit()
        } else {
            staged.commit_new()
        };
        match committed {
            Ok(()) => {
                tracing::info!(
                    eui = %eui,
                    path = %path.display(),
                    bytes = bytes.len(),
                    "stored signature"
                );
                Ok(path)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(StoreError::DuplicateIdentifier { eui, path })
            }
            Err(e) => Err(StoreError::Io { path, source: e }),
        }
    }

    /// Read the artifact for `eui`.
    pub fn load(&self, eui: Eui64) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(eui);
        fs::read(&path).map_err(StoreError::io(path))
    }
}

/// Replace `path` with `bytes` as a writable convenience copy of the latest
/// artifact.
pub fn write_working_copy(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    StagedFile::stage(path, bytes, Some(WORKING_COPY_MODE))
        .and_then(StagedFile::commit)
        .map_err(StoreError::io(path))
}
