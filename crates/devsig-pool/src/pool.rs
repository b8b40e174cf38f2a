//! # Identifier Pool
//!
//! Allocation over a ledger file. Marking an entry is read-all,
//! transform-in-memory, then write-and-rename: the new ledger is staged in a
//! temporary file beside the original and only replaces it on commit. A
//! crash before the rename leaves the original byte-identical.
//!
//! [`IdentifierPool::issue`] wraps the whole allocate, write, mark sequence
//! in the ledger lease so that concurrent issuers cannot hand out the same
//! identifier.

use std::fs;
use std::path::{Path, PathBuf};

use devsig_core::{Eui64, StagedFile};

use crate::error::PoolError;
use crate::ledger::{Annotation, Ledger};
use crate::lock::LedgerLock;

/// Allocator over one ledger file.
#[derive(Debug, Clone)]
pub struct IdentifierPool {
    path: PathBuf,
}

impl IdentifierPool {
    /// Pool backed by the ledger at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The ledger file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the ledger.
    pub fn load(&self) -> Result<Ledger, PoolError> {
        let text = fs::read_to_string(&self.path).map_err(PoolError::io(&self.path))?;
        Ledger::parse(&self.path, &text)
    }

    /// The first unannotated identifier.
    ///
    /// # Errors
    ///
    /// [`PoolError::PoolExhausted`] if every entry is annotated.
    pub fn next_available(&self) -> Result<Eui64, PoolError> {
        let ledger = self.load()?;
        let (line, eui) = ledger.first_available().ok_or_else(|| PoolError::PoolExhausted {
            path: self.path.clone(),
        })?;
        tracing::debug!(
            ledger = %self.path.display(),
            line,
            eui = %eui,
            "next available identifier"
        );
        Ok(eui)
    }

    /// Stage the ledger rewrite that marks `eui` used. Nothing is visible
    /// until [`PendingMark::commit`]; dropping the result discards it.
    ///
    /// # Errors
    ///
    /// [`PoolError::AllocationNotFound`] if no unannotated line holds `eui`.
    pub fn stage_mark(
        &self,
        eui: Eui64,
        annotation: &Annotation,
    ) -> Result<PendingMark, PoolError> {
        let mut ledger = self.load()?;
        let line = ledger
            .mark(eui, annotation)
            .ok_or_else(|| PoolError::AllocationNotFound {
                eui,
                path: self.path.clone(),
            })?;
        let staged = StagedFile::stage_preserving(&self.path, ledger.render().as_bytes())
            .map_err(PoolError::io(&self.path))?;
        Ok(PendingMark { staged, eui, line })
    }

    /// Mark `eui` used with `annotation` and replace the ledger.
    pub fn mark_used(&self, eui: Eui64, annotation: &Annotation) -> Result<(), PoolError> {
        self.stage_mark(eui, annotation)?.commit()
    }

    /// Take the ledger lease.
    pub fn lock(&self) -> Result<LedgerLock, PoolError> {
        LedgerLock::acquire(&self.path)
    }

    /// Allocate, produce and mark one identifier under the ledger lease.
    ///
    /// `produce` receives the allocated identifier, writes whatever artifact
    /// it stands for, and returns a value plus the ledger annotation. The
    /// entry is marked only if `produce` succeeds. If marking fails after
    /// the artifact was written, the artifact remains and a later run is
    /// expected to detect it before reusing the identifier.
    pub fn issue<T, E, F>(&self, produce: F) -> Result<(Eui64, T), E>
    where
        F: FnOnce(Eui64) -> Result<(T, Annotation), E>,
        E: From<PoolError>,
    {
        let _lease = self.lock()?;
        let eui = self.next_available()?;
        let (value, annotation) = produce(eui)?;
        self.mark_used(eui, &annotation)?;
        tracing::info!(
            ledger = %self.path.display(),
            eui = %eui,
            annotation = %annotation,
            "issued identifier"
        );
        Ok((eui, value))
    }
}

/// A fully written ledger rewrite waiting to replace the original.
#[derive(Debug)]
pub struct PendingMark {
    staged: StagedFile,
    eui: Eui64,
    line: usize,
}

impl PendingMark {
    /// The identifier being marked.
    pub fn eui(&self) -> Eui64 {
        self.eui
    }

    /// 1-based ledger line being rewritten.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Path of the staged ledger.
    pub fn staged_path(&self) -> &Path {
        self.staged.temp_path()
    }

    /// Atomically replace the ledger.
    pub fn commit(self) -> Result<(), PoolError> {
        let target = self.staged.target().to_path_buf();
        self.staged.commit().map_err(PoolError::io(&target))?;
        tracing::debug!(
            ledger = %target.display(),
            line = self.line,
            eui = %self.eui,
            "marked ledger entry"
        );
        Ok(())
    }
}

/// The first unannotated identifier in the ledger at `ledger`.
pub fn next_available(ledger: &Path) -> Result<Eui64, PoolError> {
    IdentifierPool::new(ledger).next_available()
}

/// Mark `eui` used in the ledger at `ledger`.
pub fn mark_used(ledger: &Path, eui: Eui64, annotation: &Annotation) -> Result<(), PoolError> {
    IdentifierPool::new(ledger).mark_used(eui, annotation)
}
