//! # Record Error Types
//!
//! Structured errors for encoding, decoding and storing signature records.
//! Decode errors carry the byte offset of the record inside the buffer so a
//! corrupt signature area can be located without a hex dump.

use std::path::PathBuf;

use devsig_core::{Eui64, ValidationError};
use thiserror::Error;

use crate::header::RecordType;

/// Errors from the record codec and record stream.
#[derive(Error, Debug)]
pub enum RecordError {
    /// A provisioning input was rejected before encoding.
    #[error("invalid record input: {0}")]
    Validation(#[from] ValidationError),

    /// The stored CRC does not match the record contents.
    #[error(
        "integrity error in record at offset {offset}: \
         stored CRC {stored:#06X}, computed {computed:#06X}"
    )]
    Integrity {
        /// Byte offset of the record.
        offset: usize,
        /// CRC read from the record trailer.
        stored: u16,
        /// CRC recomputed over header and payload.
        computed: u16,
    },

    /// The base header cannot be trusted to frame a record.
    #[error("malformed record header at offset {offset}: {reason}")]
    MalformedHeader {
        /// Byte offset of the header.
        offset: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// The buffer ends before the record does.
    #[error("record at offset {offset} is truncated: need {needed} bytes, {available} available")]
    Truncated {
        /// Byte offset of the read that failed.
        offset: usize,
        /// Bytes required.
        needed: usize,
        /// Bytes remaining in the buffer.
        available: usize,
    },

    /// The header names a record type this codec has no payload shape for.
    #[error("unknown record type tag {tag} at offset {offset}")]
    UnknownRecordType {
        /// Byte offset of the record.
        offset: usize,
        /// The unrecognised tag.
        tag: u8,
    },

    /// A specific record type was requested and another was found.
    #[error("expected a {expected} record, found type tag {found}")]
    UnexpectedRecordType {
        /// The requested type.
        expected: RecordType,
        /// The tag actually present.
        found: u8,
    },

    /// A provisioning blob has no EUI-64 record.
    #[error("provisioning blob contains no EUI-64 record")]
    MissingEuiRecord,

    /// A provisioning blob has more than one EUI-64 record.
    #[error("provisioning blob contains more than one EUI-64 record ({first} and {second})")]
    DuplicateEuiRecord {
        /// Identifier of the first EUI-64 record.
        first: Eui64,
        /// Identifier of the second EUI-64 record.
        second: Eui64,
    },
}

/// Errors from the per-device signature store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// An artifact for this identifier already exists and overwriting was
    /// not requested.
    #[error("signature file for {eui} already exists at {}", path.display())]
    DuplicateIdentifier {
        /// The identifier.
        eui: Eui64,
        /// Path of the existing file.
        path: PathBuf,
    },

    /// Underlying storage failure.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file or directory being accessed.
        path: PathBuf,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}
