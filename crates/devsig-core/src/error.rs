//! # Validation Errors
//!
//! Construction-time input validation failures for the core primitives.
//! Every variant names the field or input that was rejected so operators
//! can fix the provisioning input without reading code.

use thiserror::Error;

/// A provisioning input failed validation before any record was built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A text value does not fit its fixed-width record field.
    #[error("field `{field}` is too long: {len} bytes, maximum allowed is {max}")]
    FieldTooLong {
        /// Name of the record field.
        field: &'static str,
        /// Length of the rejected value in bytes.
        len: usize,
        /// Width of the field in bytes.
        max: usize,
    },

    /// A mandatory text value was empty.
    #[error("field `{field}` is required and must not be empty")]
    FieldRequired {
        /// Name of the record field.
        field: &'static str,
    },

    /// A text value contains bytes other than printable ASCII.
    #[error("field `{field}` must be printable ASCII: {value:?}")]
    NotPrintableAscii {
        /// Name of the record field.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The string is not 16 hex digits.
    #[error("{0:?} is not a valid EUI-64 (expected 16 hex digits)")]
    InvalidEui64(String),

    /// The string is not a `MAJOR.MINOR.PATCH` triple of 0–255 values.
    #[error("{value:?} is not a valid version: {reason}")]
    InvalidVersion {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The value is outside the range a Unix timestamp can represent.
    #[error("timestamp {0} is out of range")]
    InvalidTimestamp(i64),
}
