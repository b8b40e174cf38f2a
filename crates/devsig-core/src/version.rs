//! # Version Triples
//!
//! Two distinct three-part versions appear in device signatures:
//!
//! - [`FormatVersion`] — the version of the signature record format, carried
//!   in every base header. Informational only: the payload shape is decided
//!   by the record type tag, not by these bytes.
//! - [`ComponentVersion`] — the `major.minor.assembly` revision of a physical
//!   board or component.
//!
//! Both parse from and display as dot-separated decimal triples.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Parse `A.B.C` into three bytes.
fn parse_triple(value: &str) -> Result<[u8; 3], ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidVersion {
        value: value.to_string(),
        reason,
    };

    let parts: Vec<&str> = value.trim().split('.').collect();
    if parts.len() != 3 {
        return Err(invalid(format!(
            "expected 3 numbers separated by '.', got {}",
            parts.len()
        )));
    }

    let mut out = [0u8; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse::<u8>()
            .map_err(|_| invalid(format!("{part:?} is not a number in 0..=255")))?;
    }
    Ok(out)
}

/// Version of the signature record format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    /// Incompatible layout changes.
    pub major: u8,
    /// Backward compatible additions.
    pub minor: u8,
    /// Fixes that do not change the layout.
    pub patch: u8,
}

impl FormatVersion {
    /// The format version written by the user-signature generator.
    pub const USER_SIGNATURE: Self = Self::new(1, 0, 0);

    /// The generator version reported by the license tooling.
    pub const LICENSE_GENERATOR: Self = Self::new(0, 0, 1);

    /// Construct from parts.
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl Default for FormatVersion {
    fn default() -> Self {
        Self::USER_SIGNATURE
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for FormatVersion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [major, minor, patch] = parse_triple(s)?;
        Ok(Self::new(major, minor, patch))
    }
}

/// Hardware revision of a board, platform or component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ComponentVersion {
    /// Major revision.
    pub major: u8,
    /// Minor revision.
    pub minor: u8,
    /// Assembly variant.
    pub assembly: u8,
}

impl ComponentVersion {
    /// Construct from parts.
    pub const fn new(major: u8, minor: u8, assembly: u8) -> Self {
        Self {
            major,
            minor,
            assembly,
        }
    }
}

impl fmt::Display for ComponentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.assembly)
    }
}

impl FromStr for ComponentVersion {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [major, minor, assembly] = parse_triple(s)?;
        Ok(Self::new(major, minor, assembly))
    }
}
