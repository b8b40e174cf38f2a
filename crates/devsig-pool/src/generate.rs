//! # Ledger Generation
//!
//! Creates a fresh ledger for the inclusive range `first..=last` together
//! with a list file of the same range in the dashed display form. Boundary
//! values whose low 16 bits are all zeros or all ones are written
//! pre-annotated `RESERVED`.
//!
//! Both files are created exclusively. Each is streamed into a temporary
//! file and renamed into place, so a failure never leaves a partial ledger.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use devsig_core::{Eui64, StagedFile, Timestamp};

use crate::error::PoolError;
use crate::ledger::Annotation;

/// Largest number of entries a generated ledger may hold.
pub const MAX_RANGE_LEN: u64 = 1 << 24;

/// Output locations for [`generate_range`].
#[derive(Debug, Clone)]
pub struct RangeOutputs {
    /// The ledger file.
    pub ledger: PathBuf,
    /// The display-form list file.
    pub list: PathBuf,
}

/// What [`generate_range`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeSummary {
    /// Entries in the range.
    pub entries: u64,
    /// Of those, entries pre-annotated `RESERVED`.
    pub reserved: u64,
}

/// Number of entries in `first..=last` after validation.
///
/// # Errors
///
/// - [`PoolError::InvalidRange`] if `first > last`.
/// - [`PoolError::RangeTooLarge`] above [`MAX_RANGE_LEN`] entries.
pub fn range_len(first: Eui64, last: Eui64) -> Result<u64, PoolError> {
    if first > last {
        return Err(PoolError::InvalidRange { first, last });
    }
    let span = last.value() - first.value();
    if span >= MAX_RANGE_LEN {
        return Err(PoolError::RangeTooLarge {
            first,
            last,
            max: MAX_RANGE_LEN,
        });
    }
    Ok(span + 1)
}

/// Write the ledger and list files for `first..=last`.
///
/// `generated` is printed in both headers.
///
/// # Errors
///
/// Range errors from [`range_len`], [`PoolError::OutputExists`] if either
/// file exists, or [`PoolError::Io`].
pub fn generate_range(
    first: Eui64,
    last: Eui64,
    outputs: &RangeOutputs,
    generated: Timestamp,
) -> Result<RangeSummary, PoolError> {
    let entries = range_len(first, last)?;
    for path in [&outputs.ledger, &outputs.list] {
        if path.exists() {
            return Err(PoolError::OutputExists { path: path.clone() });
        }
    }

    let mut reserved = 0;
    let ledger = stage(&outputs.ledger, |w| {
        writeln!(w, "# EUI-64 range {first} - {last}, {generated} UTC")?;
        for eui in iter_range(first, last) {
            if eui.is_reserved() {
                reserved += 1;
                writeln!(w, "{eui},{}", Annotation::RESERVED)?;
            } else {
                writeln!(w, "{eui},")?;
            }
        }
        Ok(())
    })?;
    let list = stage(&outputs.list, |w| {
        writeln!(
            w,
            "# EUI-64 range {} - {}, {generated} UTC",
            first.printable(),
            last.printable()
        )?;
        for eui in iter_range(first, last) {
            writeln!(w, "{}", eui.printable())?;
        }
        Ok(())
    })?;

    commit_new(ledger, &outputs.ledger)?;
    if let Err(e) = commit_new(list, &outputs.list) {
        // Keep the pair consistent: no ledger without its list.
        if let Err(cleanup) = std::fs::remove_file(&outputs.ledger) {
            tracing::warn!(
                path = %outputs.ledger.display(),
                error = %cleanup,
                "failed to remove ledger after list error"
            );
        }
        return Err(e);
    }

    tracing::info!(
        ledger = %outputs.ledger.display(),
        list = %outputs.list.display(),
        entries,
        reserved,
        "generated EUI-64 ledger"
    );
    Ok(RangeSummary { entries, reserved })
}

fn iter_range(first: Eui64, last: Eui64) -> impl Iterator<Item = Eui64> {
    (first.value()..=last.value()).map(Eui64::new)
}

fn stage<F>(path: &Path, write: F) -> Result<StagedFile, PoolError>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    StagedFile::stage_with(path, None, write).map_err(PoolError::io(path))
}

fn commit_new(staged: StagedFile, path: &Path) -> Result<(), PoolError> {
    staged.commit_new().map_err(|e| {
        if e.kind() == io::ErrorKind::AlreadyExists {
            PoolError::OutputExists {
                path: path.to_path_buf(),
            }
        } else {
            PoolError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}
