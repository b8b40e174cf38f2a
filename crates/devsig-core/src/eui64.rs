//! # EUI-64 Identifier
//!
//! The IEEE 64-bit Extended Unique Identifier that establishes a device's
//! identity. Stored big-endian on the wire.
//!
//! ## Text Forms
//!
//! - **Canonical** (`Display`, ledgers, filenames): 16 uppercase hex digits,
//!   no separators, e.g. `70B3D5A4E0000001`.
//! - **Printable** ([`Eui64::printable`]): 8 dash-separated octets, most
//!   significant first, e.g. `70-B3-D5-A4-E0-00-00-01`.
//!
//! ## Reserved Values
//!
//! Identifiers whose low 16 bits are all-zero or all-ones are boundary
//! values. Ledgers pre-annotate them `RESERVED` and they are never issued.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Number of hex digits in the canonical text form.
pub const EUI64_HEX_LEN: usize = 16;

/// A 64-bit device identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Eui64(u64);

impl Eui64 {
    /// Wrap a raw 64-bit value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw 64-bit value.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The low 16 bits, i.e. the position inside a /48 allocation block.
    pub const fn short(self) -> u16 {
        self.0 as u16
    }

    /// Whether this value is a block boundary (`...0000` or `...FFFF`).
    pub const fn is_reserved(self) -> bool {
        let short = self.short();
        short == 0 || short == 0xFFFF
    }

    /// Big-endian wire bytes.
    pub const fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Build from big-endian wire bytes.
    pub const fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_be_bytes(bytes))
    }

    /// The 16-digit uppercase hex form used in ledgers and filenames.
    pub fn to_hex(self) -> String {
        format!("{:016X}", self.0)
    }

    /// The dash-separated octet form used in printed lists and labels.
    pub fn printable(self) -> String {
        self.to_be_bytes()
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Filename of the per-device artifact: `EUI-64_{HEX}.bin`.
    pub fn artifact_filename(self) -> String {
        format!("EUI-64_{}.bin", self.to_hex())
    }
}

impl fmt::Display for Eui64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}", self.0)
    }
}

impl FromStr for Eui64 {
    type Err = ValidationError;

    /// Parse exactly 16 hex digits. Lowercase digits are accepted on input;
    /// output is always uppercase.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != EUI64_HEX_LEN || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidEui64(s.to_string()));
        }
        u64::from_str_radix(s, 16)
            .map(Self)
            .map_err(|_| ValidationError::InvalidEui64(s.to_string()))
    }
}

impl From<u64> for Eui64 {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Eui64> for u64 {
    fn from(eui: Eui64) -> Self {
        eui.0
    }
}

impl Serialize for Eui64 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Eui64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
