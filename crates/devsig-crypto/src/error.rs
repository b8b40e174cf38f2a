//! # Cryptographic Error Types
//!
//! Structured errors for license construction, signing and verification.

use std::path::PathBuf;

use devsig_core::{Eui64, ValidationError};
use thiserror::Error;

/// Errors from the license signing workflow.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// The private key could not be decoded.
    #[error("invalid P-256 private key: {0}")]
    InvalidPrivateKey(String),

    /// The public key could not be decoded.
    #[error("invalid P-256 public key: {0}")]
    InvalidPublicKey(String),

    /// The signing primitive failed.
    #[error("ECDSA signing failed: {0}")]
    SigningFailed(String),

    /// The license signature does not verify under the given key.
    #[error("license signature for {eui} does not verify")]
    VerificationFailed {
        /// Identifier the license was issued for.
        eui: Eui64,
    },

    /// A license or pre-signing buffer has the wrong length.
    #[error("invalid {what} length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Which structure was being decoded.
        what: &'static str,
        /// Required length.
        expected: usize,
        /// Length supplied.
        actual: usize,
    },

    /// The pre-signing record does not carry the license type tag.
    #[error("unexpected license type tag {0}")]
    InvalidLicenseType(u8),

    /// The Beatstack parameter file is missing a key or has a bad value.
    #[error("invalid Beatstack parameters in {source_name}: {reason}")]
    BeatstackParams {
        /// File (or other source) the parameters came from.
        source_name: String,
        /// What was wrong.
        reason: String,
    },

    /// A field failed core validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Key or parameter file could not be read.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// The file being accessed.
        path: PathBuf,
        /// The OS error.
        #[source]
        source: std::io::Error,
    },
}

impl CryptoError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Self::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_length_display() {
        let err = CryptoError::InvalidLength {
            what: "license",
            expected: 84,
            actual: 80,
        };
        let msg = err.to_string();
        assert!(msg.contains("license"));
        assert!(msg.contains("84"));
        assert!(msg.contains("80"));
    }

    #[test]
    fn verification_failed_names_identifier() {
        let err = CryptoError::VerificationFailed {
            eui: Eui64::new(0x70B3_D5A4_E000_0001),
        };
        assert!(err.to_string().contains("70B3D5A4E0000001"));
    }

    #[test]
    fn beatstack_error_names_source() {
        let err = CryptoError::BeatstackParams {
            source_name: "beatstack.conf".to_string(),
            reason: "missing NODES_IN_BEAT".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("beatstack.conf"));
        assert!(msg.contains("NODES_IN_BEAT"));
    }
}
