//! # Inspection
//!
//! Decoded records as plain serializable views. Binary fields are rendered
//! in their human forms: identifiers as hex, UUIDs hyphenated, names with
//! their zero padding removed.

use serde::Serialize;

use crate::record::{ComponentRecord, EuiRecord, Record};

/// A decoded record, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    /// `eui64`, `board`, `platform` or `component`.
    pub record_type: String,
    /// Record format version, `major.minor.patch`.
    pub format_version: String,
    /// Declared record size in bytes.
    pub size: u16,
    /// Creation time, Unix seconds.
    pub created: i64,
    /// Creation time, RFC 3339 UTC.
    pub created_utc: String,
    /// Type-specific fields.
    #[serde(flatten)]
    pub body: RecordBody,
}

/// Type-specific part of a [`RecordView`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RecordBody {
    /// Identity record.
    Eui {
        /// 16 uppercase hex digits.
        eui64: String,
    },
    /// Board, platform or component record.
    Component {
        /// Design identifier.
        uuid: String,
        /// Name without padding.
        name: String,
        /// `major.minor.assembly`.
        version: String,
        /// Text serial if printable, otherwise the UUID form.
        serial: String,
        /// Manufacturer identifier.
        manufacturer: String,
        /// Index among repeated components.
        position: u8,
        /// Declared trailing data length.
        data_length: u16,
    },
}

impl From<&EuiRecord> for RecordBody {
    fn from(record: &EuiRecord) -> Self {
        Self::Eui {
            eui64: record.eui().to_hex(),
        }
    }
}

impl From<&ComponentRecord> for RecordBody {
    fn from(record: &ComponentRecord) -> Self {
        Self::Component {
            uuid: record.uuid().hyphenated().to_string(),
            name: record.name().as_text(),
            version: record.version().to_string(),
            serial: record.serial().to_string(),
            manufacturer: record.manufacturer().hyphenated().to_string(),
            position: record.position(),
            data_length: record.data_length(),
        }
    }
}

impl From<&Record> for RecordView {
    fn from(record: &Record) -> Self {
        let header = record.header();
        let body = match record {
            Record::Eui(r) => RecordBody::from(r),
            Record::Component(r) => RecordBody::from(r),
        };
        Self {
            record_type: record.record_type().name().to_string(),
            format_version: header.version.to_string(),
            size: header.size,
            created: header.created.unix(),
            created_utc: header.created.to_rfc3339(),
            body,
        }
    }
}

/// Pretty-printed JSON array of `records`.
pub fn render_json(records: &[Record]) -> Result<String, serde_json::Error> {
    let views: Vec<RecordView> = records.iter().map(RecordView::from).collect();
    serde_json::to_string_pretty(&views)
}
