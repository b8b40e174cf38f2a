//! # Pre-Signing Record
//!
//! The exact 20 bytes a license signature covers:
//!
//! ```text
//! license_type u8 (= 4) | eui u64 | unix_time i64
//!   | nodes_in_cluster u8 | partnerships u8 | clusters u8
//! ```
//!
//! Big-endian, no padding, no CRC. The layout is frozen: reordering any
//! field invalidates every license ever issued.

use std::fs;
use std::path::Path;

use devsig_core::{Eui64, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Type tag carried in the first byte of every pre-signing record.
pub const LICENSE_TYPE: u8 = 4;

/// Encoded length of [`PreSigningRecord`].
pub const PRESIGN_LEN: usize = 20;

const BEATS_IN_CYCLE: &str = "BEATS_IN_CYCLE";
const NODES_IN_BEAT: &str = "NODES_IN_BEAT";
const MAX_PARTNER_COUNT_FOR_NODE: &str = "MAX_PARTNER_COUNT_FOR_NODE";

/// Cluster and partnership sizing licensed to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BeatstackParams {
    /// Nodes per cluster (`NODES_IN_BEAT`).
    pub nodes_in_cluster: u8,
    /// Partnerships per node (`MAX_PARTNER_COUNT_FOR_NODE`).
    pub partnerships: u8,
    /// Clusters (`BEATS_IN_CYCLE`).
    pub clusters: u8,
}

impl BeatstackParams {
    /// Parse a Beatstack configuration text.
    ///
    /// Lines of the form `NAME = value` are read; anything else is ignored.
    /// A line whose key ends in one of the three parameter names counts, so
    /// `#define`-style prefixes are tolerated. All three parameters must be
    /// present and fit in a byte.
    ///
    /// `source_name` labels the text in errors.
    pub fn from_config_str(source_name: &str, text: &str) -> Result<Self, CryptoError> {
        let err = |reason: String| CryptoError::BeatstackParams {
            source_name: source_name.to_string(),
            reason,
        };

        let mut clusters = None;
        let mut nodes = None;
        let mut partners = None;
        for (index, line) in text.lines().enumerate() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let name = key.split_whitespace().last().unwrap_or_default();
            let slot = match name {
                BEATS_IN_CYCLE => &mut clusters,
                NODES_IN_BEAT => &mut nodes,
                MAX_PARTNER_COUNT_FOR_NODE => &mut partners,
                _ => continue,
            };
            let value = value.trim().trim_end_matches(';').trim();
            let parsed = value.parse::<u8>().map_err(|e| {
                err(format!("line {}: {name} = {value:?}: {e}", index + 1))
            })?;
            *slot = Some(parsed);
        }

        let require =
            |value: Option<u8>, name: &str| value.ok_or_else(|| err(format!("missing {name}")));
        Ok(Self {
            nodes_in_cluster: require(nodes, NODES_IN_BEAT)?,
            partnerships: require(partners, MAX_PARTNER_COUNT_FOR_NODE)?,
            clusters: require(clusters, BEATS_IN_CYCLE)?,
        })
    }

    /// Read and parse a Beatstack configuration file.
    pub fn from_config_file(path: &Path) -> Result<Self, CryptoError> {
        let text = fs::read_to_string(path).map_err(CryptoError::io(path))?;
        Self::from_config_str(&path.display().to_string(), &text)
    }
}

/// The signed portion of a license.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreSigningRecord {
    /// Licensed device.
    pub eui: Eui64,
    /// Issue time.
    pub created: Timestamp,
    /// Licensed sizing.
    pub params: BeatstackParams,
}

impl PreSigningRecord {
    /// Assemble a record.
    pub fn new(eui: Eui64, created: Timestamp, params: BeatstackParams) -> Self {
        Self {
            eui,
            created,
            params,
        }
    }

    /// The canonical 20 bytes.
    pub fn to_bytes(&self) -> [u8; PRESIGN_LEN] {
        let mut out = [0u8; PRESIGN_LEN];
        out[0] = LICENSE_TYPE;
        out[1..9].copy_from_slice(&self.eui.to_be_bytes());
        out[9..17].copy_from_slice(&self.created.unix().to_be_bytes());
        out[17] = self.params.nodes_in_cluster;
        out[18] = self.params.partnerships;
        out[19] = self.params.clusters;
        out
    }

    /// Decode the canonical 20 bytes.
    ///
    /// # Errors
    ///
    /// - [`CryptoError::InvalidLength`] unless exactly 20 bytes are given.
    /// - [`CryptoError::InvalidLicenseType`] if the tag is not 4.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes: &[u8; PRESIGN_LEN] = bytes.try_into().map_err(|_| CryptoError::InvalidLength {
            what: "pre-signing record",
            expected: PRESIGN_LEN,
            actual: bytes.len(),
        })?;
        if bytes[0] != LICENSE_TYPE {
            return Err(CryptoError::InvalidLicenseType(bytes[0]));
        }
        let mut eui = [0u8; 8];
        eui.copy_from_slice(&bytes[1..9]);
        let mut unix = [0u8; 8];
        unix.copy_from_slice(&bytes[9..17]);
        Ok(Self {
            eui: Eui64::from_be_bytes(eui),
            created: Timestamp::from_unix(i64::from_be_bytes(unix))?,
            params: BeatstackParams {
                nodes_in_cluster: bytes[17],
                partnerships: bytes[18],
                clusters: bytes[19],
            },
        })
    }
}

/// Canonical pre-signing bytes for `eui` at `created` with `params`.
pub fn build_presign(eui: Eui64, created: Timestamp, params: BeatstackParams) -> [u8; PRESIGN_LEN] {
    PreSigningRecord::new(eui, created, params).to_bytes()
}
