//! # Atomic File Staging
//!
//! Every file this workspace replaces or creates is first written in full to
//! a temporary file in the target's directory, flushed, and only then moved
//! over the target with a single rename. A crash at any point before the
//! rename leaves the target byte-identical to what it was; readers never
//! observe a half-written file.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use devsig_core::StagedFile;
//! # fn main() -> std::io::Result<()> {
//! let staged = StagedFile::stage(Path::new("eui.txt"), b"70B3D5A4E0000001,\n", None)?;
//! // Nothing is visible at eui.txt until:
//! staged.commit()?;
//! # Ok(())
//! # }
//! ```

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

/// Permission bits for immutable per-device artifacts.
pub const READ_ONLY_MODE: u32 = 0o440;

/// Permission bits for the convenience working copy of an artifact.
pub const WORKING_COPY_MODE: u32 = 0o640;

/// Fully written contents waiting to replace a target path.
///
/// Dropping a `StagedFile` without committing removes the temporary file and
/// leaves the target untouched.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
    target: PathBuf,
}

impl StagedFile {
    /// Write `contents` to a temporary file next to `target`.
    ///
    /// `mode` sets Unix permission bits on the staged file before it becomes
    /// visible; it is ignored on other platforms.
    pub fn stage(target: &Path, contents: &[u8], mode: Option<u32>) -> io::Result<Self> {
        Self::stage_with(target, mode, |w| w.write_all(contents))
    }

    /// Stage contents produced by `write`, which receives a buffered writer
    /// over the temporary file. Used for outputs too large to build in
    /// memory.
    pub fn stage_with<F>(target: &Path, mode: Option<u32>, write: F) -> io::Result<Self>
    where
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let mut temp = tempfile::Builder::new()
            .prefix(".devsig-")
            .suffix(".tmp")
            .tempfile_in(parent_dir(target))?;
        {
            let mut out = BufWriter::new(temp.as_file_mut());
            write(&mut out)?;
            out.flush()?;
        }
        temp.as_file().sync_all()?;
        if let Some(mode) = mode {
            set_mode(temp.path(), mode)?;
        }
        Ok(Self {
            temp,
            target: target.to_path_buf(),
        })
    }

    /// Like [`StagedFile::stage`], copying the permissions of the existing
    /// target onto the staged file.
    pub fn stage_preserving(target: &Path, contents: &[u8]) -> io::Result<Self> {
        let permissions = fs::metadata(target)?.permissions();
        let staged = Self::stage(target, contents, None)?;
        fs::set_permissions(staged.temp.path(), permissions)?;
        Ok(staged)
    }

    /// Path of the temporary file holding the staged contents.
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// The path that `commit` will replace.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Atomically replace the target with the staged contents.
    pub fn commit(self) -> io::Result<()> {
        let Self { temp, target } = self;
        temp.persist(&target).map_err(|e| e.error)?;
        tracing::debug!(path = %target.display(), "committed staged file");
        Ok(())
    }

    /// Atomically create the target with the staged contents, failing with
    /// [`io::ErrorKind::AlreadyExists`] if something is already there.
    pub fn commit_new(self) -> io::Result<()> {
        let Self { temp, target } = self;
        temp.persist_noclobber(&target).map_err(|e| e.error)?;
        tracing::debug!(path = %target.display(), "created file from staged contents");
        Ok(())
    }
}

/// The directory a relative or bare filename lives in.
fn parent_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> io::Result<()> {
    Ok(())
}
