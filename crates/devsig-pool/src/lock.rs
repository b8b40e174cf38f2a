//! # Ledger Lease
//!
//! Allocation reads the ledger, writes a signature, and then marks the
//! ledger. Two issuers interleaving those steps would hand out the same
//! identifier. The lease is a `<ledger>.lock` file created with create-new
//! semantics for the whole sequence; a second issuer fails fast with
//! [`PoolError::Locked`].
//!
//! The lock file holds the owner's process id. A holder that crashes leaves
//! it behind and an operator removes it.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::PoolError;

/// Held lease on a ledger. Released on drop.
#[derive(Debug)]
pub struct LedgerLock {
    path: PathBuf,
}

impl LedgerLock {
    /// Lock file path for `ledger`.
    pub fn path_for(ledger: &Path) -> PathBuf {
        let mut name = OsString::from(ledger.as_os_str());
        name.push(".lock");
        PathBuf::from(name)
    }

    /// Take the lease on `ledger`.
    ///
    /// # Errors
    ///
    /// - [`PoolError::Locked`] if the lock file already exists.
    /// - [`PoolError::Io`] if it cannot be created.
    pub fn acquire(ledger: &Path) -> Result<Self, PoolError> {
        let path = Self::path_for(ledger);
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(PoolError::Locked { path });
            }
            Err(e) => return Err(PoolError::Io { path, source: e }),
        };
        let lock = Self { path };
        writeln!(file, "{}", std::process::id()).map_err(PoolError::io(&lock.path))?;
        tracing::debug!(path = %lock.path.display(), "acquired ledger lease");
        Ok(lock)
    }

    /// The lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "released ledger lease"),
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove ledger lock"
            ),
        }
    }
}
