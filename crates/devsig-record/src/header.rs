//! # Base Header
//!
//! The fixed 14-byte prefix of every record. Its `size` field is the only
//! framing information in a signature area: the stream decoder advances by
//! it, so a header is only trusted when `size` lies between the smallest
//! possible record and [`MAX_RECORD_SIZE`].

use std::fmt;

use devsig_core::{FormatVersion, Timestamp};

use crate::error::RecordError;
use crate::wire::Reader;

/// Encoded length of [`BaseHeader`].
pub const HEADER_LEN: usize = 14;

/// Length of the CRC trailer.
pub const CRC_LEN: usize = 2;

/// Largest declared record size accepted by a decoder.
pub const MAX_RECORD_SIZE: usize = 1024;

/// Payload length of an EUI-64 record.
const EUI_PAYLOAD_LEN: usize = 8;

/// Payload length of a board/platform/component record.
const COMPONENT_PAYLOAD_LEN: usize = 16 + 16 + 3 + 16 + 16 + 1 + 2;

/// Record kinds with a known payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RecordType {
    /// The device identity record.
    Eui64 = 0,
    /// The main board of the device.
    Board = 1,
    /// The platform (module, SoM) the board carries.
    Platform = 2,
    /// Any other identified sub-component.
    Component = 3,
}

impl RecordType {
    /// All known record types.
    pub const ALL: [RecordType; 4] = [Self::Eui64, Self::Board, Self::Platform, Self::Component];

    /// The type for a wire tag, if known.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Eui64),
            1 => Some(Self::Board),
            2 => Some(Self::Platform),
            3 => Some(Self::Component),
            _ => None,
        }
    }

    /// The wire tag.
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Full encoded length of a record of this type, header and CRC included.
    pub const fn encoded_len(self) -> usize {
        let payload = match self {
            Self::Eui64 => EUI_PAYLOAD_LEN,
            Self::Board | Self::Platform | Self::Component => COMPONENT_PAYLOAD_LEN,
        };
        HEADER_LEN + payload + CRC_LEN
    }

    /// Lowercase name used in logs and JSON.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Eui64 => "eui64",
            Self::Board => "board",
            Self::Platform => "platform",
            Self::Component => "component",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The common prefix of every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseHeader {
    /// Record format version.
    pub version: FormatVersion,
    /// Total record length: header, payload and CRC.
    pub size: u16,
    /// Raw type tag. Kept raw so unknown kinds can be framed and skipped.
    pub record_type: u8,
    /// When the signature was generated.
    pub created: Timestamp,
}

impl BaseHeader {
    /// Header for a new record of a known type; `size` is derived from it.
    pub fn new(version: FormatVersion, kind: RecordType, created: Timestamp) -> Self {
        debug_assert!(kind.encoded_len() <= MAX_RECORD_SIZE);
        Self {
            version,
            size: kind.encoded_len() as u16,
            record_type: kind.tag(),
            created,
        }
    }

    /// The record kind, or `None` for a tag this codec does not know.
    pub fn kind(&self) -> Option<RecordType> {
        RecordType::from_tag(self.record_type)
    }

    /// Declared record length in bytes.
    pub fn record_len(&self) -> usize {
        usize::from(self.size)
    }

    /// Append the 14 header bytes to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(self.version.major);
        out.push(self.version.minor);
        out.push(self.version.patch);
        out.extend_from_slice(&self.size.to_be_bytes());
        out.push(self.record_type);
        out.extend_from_slice(&self.created.unix().to_be_bytes());
    }

    /// Decode and sanity-check a header at the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        Self::decode_at(bytes, 0)
    }

    /// Decode and sanity-check a header at `offset` in `buf`.
    ///
    /// # Errors
    ///
    /// - [`RecordError::Truncated`] if fewer than 14 bytes remain.
    /// - [`RecordError::MalformedHeader`] if `size` is smaller than a header
    ///   plus CRC, larger than [`MAX_RECORD_SIZE`], or the timestamp cannot
    ///   be represented.
    pub(crate) fn decode_at(buf: &[u8], offset: usize) -> Result<Self, RecordError> {
        let mut r = Reader::at(buf, offset);
        let version = FormatVersion::new(r.u8()?, r.u8()?, r.u8()?);
        let size = r.u16()?;
        let record_type = r.u8()?;
        let unix_time = r.i64()?;

        let len = usize::from(size);
        if len < HEADER_LEN + CRC_LEN || len > MAX_RECORD_SIZE {
            return Err(RecordError::MalformedHeader {
                offset,
                reason: format!(
                    "declared size {size} outside {}..={MAX_RECORD_SIZE}",
                    HEADER_LEN + CRC_LEN
                ),
            });
        }

        let created = Timestamp::from_unix(unix_time).map_err(|e| RecordError::MalformedHeader {
            offset,
            reason: e.to_string(),
        })?;

        Ok(Self {
            version,
            size,
            record_type,
            created,
        })
    }
}
