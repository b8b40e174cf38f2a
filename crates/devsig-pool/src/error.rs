//! # Pool Error Types
//!
//! Every variant names the ledger or output file involved.

use std::path::PathBuf;

use devsig_core::Eui64;
use thiserror::Error;

/// Errors from ledger parsing, allocation and generation.
#[derive(Error, Debug)]
pub enum PoolError {
    /// Every data line of the ledger is annotated.
    #[error("no unused EUI-64 left in ledger {}", path.display())]
    PoolExhausted {
        /// The ledger.
        path: PathBuf,
    },

    /// `mark_used` found no unannotated line for the identifier.
    #[error("no unused entry for {eui} in ledger {}", path.display())]
    AllocationNotFound {
        /// The identifier that was to be marked.
        eui: Eui64,
        /// The ledger.
        path: PathBuf,
    },

    /// A data line does not start with a 16-digit hex identifier.
    #[error("invalid ledger entry at {}:{line}: {text:?}", path.display())]
    InvalidEntry {
        /// The ledger.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// The offending line.
        text: String,
    },

    /// An annotation would leave the entry looking unused or break the
    /// line structure.
    #[error("invalid ledger annotation: {reason}")]
    InvalidAnnotation {
        /// Why it was rejected.
        reason: String,
    },

    /// Another issuer holds the ledger lease.
    #[error("ledger is locked by another issuer: {} exists", path.display())]
    Locked {
        /// The lock file.
        path: PathBuf,
    },

    /// `first` is greater than `last`.
    #[error("invalid EUI-64 range: {first} is greater than {last}")]
    InvalidRange {
        /// First identifier.
        first: Eui64,
        /// Last identifier.
        last: Eui64,
    },

    /// The requested range has more entries than a ledger may hold.
    #[error("EUI-64 range {first} - {last} exceeds {max} entries")]
    RangeTooLarge {
        /// First identifier.
        first: Eui64,
        /// Last identifier.
        last: Eui64,
        /// Largest accepted entry count.
        max: u64,
    },

    /// A generated output would overwrite an existing file.
    #[error("refusing to overwrite existing file {}", path.display())]
    OutputExists {
        /// The existing file.
        path: PathBuf,
    },

    /// Underlying storage failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}

impl PoolError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exhausted_names_the_ledger() {
        let err = PoolError::PoolExhausted {
            path: PathBuf::from("eui.txt"),
        };
        assert!(err.to_string().contains("eui.txt"));
    }

    #[test]
    fn invalid_entry_shows_location() {
        let err = PoolError::InvalidEntry {
            path: PathBuf::from("eui.txt"),
            line: 7,
            text: "not-hex".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("eui.txt:7"));
        assert!(msg.contains("not-hex"));
    }

    #[test]
    fn allocation_not_found_names_identifier() {
        let err = PoolError::AllocationNotFound {
            eui: Eui64::new(0xAAAA_AAAA_AAAA_AAA1),
            path: PathBuf::from("eui.txt"),
        };
        assert!(err.to_string().contains("AAAAAAAAAAAAAAA1"));
    }
}
