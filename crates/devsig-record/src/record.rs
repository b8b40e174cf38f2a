//! # Record Codec
//!
//! Typed records and their fixed big-endian encodings. Decoding reads the
//! base header first, picks the payload shape from its type tag, checks the
//! declared size against that shape, verifies the CRC over header and
//! payload, and only then parses the payload.
//!
//! Board, platform and component records share one layout; the header tag
//! carries the role.

use devsig_core::{
    ComponentVersion, Eui64, FixedText, FormatVersion, SerialNumber, Timestamp, FIELD_WIDTH,
};
use uuid::Uuid;

use crate::crc;
use crate::error::RecordError;
use crate::header::{BaseHeader, RecordType, CRC_LEN, HEADER_LEN};
use crate::wire::Reader;

// ---------------------------------------------------------------------------
// EUI-64 record
// ---------------------------------------------------------------------------

/// Establishes the device identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EuiRecord {
    header: BaseHeader,
    eui: Eui64,
}

impl EuiRecord {
    /// Build an identity record.
    pub fn new(version: FormatVersion, created: Timestamp, eui: Eui64) -> Self {
        Self {
            header: BaseHeader::new(version, RecordType::Eui64, created),
            eui,
        }
    }

    /// The base header.
    pub fn header(&self) -> &BaseHeader {
        &self.header
    }

    /// The device identifier.
    pub fn eui(&self) -> Eui64 {
        self.eui
    }

    /// Encode with CRC.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(RecordType::Eui64.encoded_len());
        self.header.encode_into(&mut out);
        out.extend_from_slice(&self.eui.to_be_bytes());
        crc::append(&mut out);
        out
    }

    /// Decode an EUI-64 record from the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        match Record::decode_as(bytes, RecordType::Eui64)? {
            Record::Eui(record) => Ok(record),
            Record::Component(c) => Err(RecordError::UnexpectedRecordType {
                expected: RecordType::Eui64,
                found: c.header.record_type,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Component record
// ---------------------------------------------------------------------------

/// The role a component record plays. Maps one-to-one onto the header tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentRole {
    /// The device's main board.
    Board,
    /// The platform module on the board.
    Platform,
    /// Any other sub-component.
    Component,
}

impl ComponentRole {
    /// The record type carrying this role.
    pub const fn record_type(self) -> RecordType {
        match self {
            Self::Board => RecordType::Board,
            Self::Platform => RecordType::Platform,
            Self::Component => RecordType::Component,
        }
    }

    /// The role for a record type, `None` for the EUI-64 record.
    pub const fn from_record_type(kind: RecordType) -> Option<Self> {
        match kind {
            RecordType::Eui64 => None,
            RecordType::Board => Some(Self::Board),
            RecordType::Platform => Some(Self::Platform),
            RecordType::Component => Some(Self::Component),
        }
    }
}

/// Provisioning input for a component record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSpec {
    /// Board, platform or component.
    pub role: ComponentRole,
    /// Identifier of the component design.
    pub uuid: Uuid,
    /// Human-readable name, 1 to 16 bytes.
    pub name: String,
    /// Hardware revision.
    pub version: ComponentVersion,
    /// Serial number.
    pub serial: SerialNumber,
    /// Identifier of the manufacturer.
    pub manufacturer: Uuid,
    /// Index among repeated components of the same kind.
    pub position: u8,
    /// Length of component-specific data following the record. Advisory.
    pub data_length: u16,
}

impl ComponentSpec {
    /// Spec with the given role, name and version; everything else zero.
    pub fn new(role: ComponentRole, name: impl Into<String>, version: ComponentVersion) -> Self {
        Self {
            role,
            uuid: Uuid::nil(),
            name: name.into(),
            version,
            serial: SerialNumber::default(),
            manufacturer: Uuid::nil(),
            position: 0,
            data_length: 0,
        }
    }
}

/// Describes the board, platform or a sub-component of the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    header: BaseHeader,
    uuid: Uuid,
    name: FixedText<FIELD_WIDTH>,
    version: ComponentVersion,
    serial: SerialNumber,
    manufacturer: Uuid,
    position: u8,
    data_length: u16,
}

impl ComponentRecord {
    /// Build a component record.
    ///
    /// # Errors
    ///
    /// - `FieldRequired` if the name is empty.
    /// - `FieldTooLong` if the name exceeds 16 bytes.
    pub fn new(
        version: FormatVersion,
        created: Timestamp,
        spec: &ComponentSpec,
    ) -> Result<Self, RecordError> {
        let name = FixedText::required("name", &spec.name)?;
        Ok(Self {
            header: BaseHeader::new(version, spec.role.record_type(), created),
            uuid: spec.uuid,
            name,
            version: spec.version,
            serial: spec.serial,
            manufacturer: spec.manufacturer,
            position: spec.position,
            data_length: spec.data_length,
        })
    }

    /// The base header.
    pub fn header(&self) -> &BaseHeader {
        &self.header
    }

    /// Board, platform or component.
    pub fn role(&self) -> ComponentRole {
        self.header
            .kind()
            .and_then(ComponentRole::from_record_type)
            .unwrap_or(ComponentRole::Component)
    }

    /// Identifier of the component design.
    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    /// The name field.
    pub fn name(&self) -> &FixedText<FIELD_WIDTH> {
        &self.name
    }

    /// Hardware revision.
    pub fn version(&self) -> ComponentVersion {
        self.version
    }

    /// Serial number.
    pub fn serial(&self) -> &SerialNumber {
        &self.serial
    }

    /// Identifier of the manufacturer.
    pub fn manufacturer(&self) -> Uuid {
        self.manufacturer
    }

    /// Index among repeated components.
    pub fn position(&self) -> u8 {
        self.position
    }

    /// Declared length of trailing component data.
    pub fn data_length(&self) -> u16 {
        self.data_length
    }

    /// Encode with CRC.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(RecordType::Component.encoded_len());
        self.header.encode_into(&mut out);
        out.extend_from_slice(self.uuid.as_bytes());
        out.extend_from_slice(self.name.as_raw());
        out.push(self.version.major);
        out.push(self.version.minor);
        out.push(self.version.assembly);
        out.extend_from_slice(self.serial.as_raw());
        out.extend_from_slice(self.manufacturer.as_bytes());
        out.push(self.position);
        out.extend_from_slice(&self.data_length.to_be_bytes());
        crc::append(&mut out);
        out
    }

    /// Decode a component record with the given role from the start of `bytes`.
    pub fn decode(bytes: &[u8], role: ComponentRole) -> Result<Self, RecordError> {
        match Record::decode_as(bytes, role.record_type())? {
            Record::Component(record) => Ok(record),
            Record::Eui(e) => Err(RecordError::UnexpectedRecordType {
                expected: role.record_type(),
                found: e.header.record_type,
            }),
        }
    }

    fn decode_payload(header: BaseHeader, r: &mut Reader<'_>) -> Result<Self, RecordError> {
        let uuid = Uuid::from_bytes(r.array()?);
        let name = FixedText::from_raw(r.array()?);
        let version = ComponentVersion::new(r.u8()?, r.u8()?, r.u8()?);
        let serial = SerialNumber::from_raw(r.array()?);
        let manufacturer = Uuid::from_bytes(r.array()?);
        let position = r.u8()?;
        let data_length = r.u16()?;
        Ok(Self {
            header,
            uuid,
            name,
            version,
            serial,
            manufacturer,
            position,
            data_length,
        })
    }
}

// ---------------------------------------------------------------------------
// Tagged union
// ---------------------------------------------------------------------------

/// Any record with a known payload shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// Identity record.
    Eui(EuiRecord),
    /// Board, platform or component record.
    Component(ComponentRecord),
}

impl Record {
    /// The base header.
    pub fn header(&self) -> &BaseHeader {
        match self {
            Self::Eui(r) => r.header(),
            Self::Component(r) => r.header(),
        }
    }

    /// The record type.
    pub fn record_type(&self) -> RecordType {
        match self {
            Self::Eui(_) => RecordType::Eui64,
            Self::Component(r) => r.role().record_type(),
        }
    }

    /// Encode with CRC.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Eui(r) => r.encode(),
            Self::Component(r) => r.encode(),
        }
    }

    /// Decode whichever known record starts `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        Self::decode_at(bytes, 0)
    }

    /// Decode the record at the start of `bytes`, requiring it to be of
    /// type `expected`.
    pub fn decode_as(bytes: &[u8], expected: RecordType) -> Result<Self, RecordError> {
        let header = BaseHeader::decode(bytes)?;
        if header.record_type != expected.tag() {
            return Err(RecordError::UnexpectedRecordType {
                expected,
                found: header.record_type,
            });
        }
        Self::decode_at(bytes, 0)
    }

    /// Decode the record at `offset` in `buf`.
    pub(crate) fn decode_at(buf: &[u8], offset: usize) -> Result<Self, RecordError> {
        let header = BaseHeader::decode_at(buf, offset)?;
        let kind = header.kind().ok_or(RecordError::UnknownRecordType {
            offset,
            tag: header.record_type,
        })?;

        let expected_len = kind.encoded_len();
        if header.record_len() != expected_len {
            return Err(RecordError::MalformedHeader {
                offset,
                reason: format!(
                    "declared size {} does not match {expected_len} for a {kind} record",
                    header.size
                ),
            });
        }

        let available = buf.len().saturating_sub(offset);
        if available < expected_len {
            return Err(RecordError::Truncated {
                offset,
                needed: expected_len,
                available,
            });
        }

        let framed = &buf[offset..offset + expected_len];
        crc::check(framed).map_err(|(stored, computed)| RecordError::Integrity {
            offset,
            stored,
            computed,
        })?;

        let mut r = Reader::at(&framed[..expected_len - CRC_LEN], HEADER_LEN);
        match kind {
            RecordType::Eui64 => Ok(Self::Eui(EuiRecord {
                header,
                eui: Eui64::new(r.u64()?),
            })),
            RecordType::Board | RecordType::Platform | RecordType::Component => {
                ComponentRecord::decode_payload(header, &mut r).map(Self::Component)
            }
        }
    }
}

impl From<EuiRecord> for Record {
    fn from(record: EuiRecord) -> Self {
        Self::Eui(record)
    }
}

impl From<ComponentRecord> for Record {
    fn from(record: ComponentRecord) -> Self {
        Self::Component(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devsig_core::ValidationError;

    fn ts() -> Timestamp {
        Timestamp::from_unix(1_700_000_000).unwrap()
    }

    fn board_spec() -> ComponentSpec {
        ComponentSpec {
            role: ComponentRole::Board,
            uuid: Uuid::from_u128(0x0011_2233_4455_6677_8899_aabb_ccdd_eeff),
            name: "smenete".to_string(),
            version: ComponentVersion::new(2, 1, 7),
            serial: SerialNumber::from_text("SN-0042").unwrap(),
            manufacturer: Uuid::from_u128(0xfeed_beef),
            position: 0,
            data_length: 0,
        }
    }

    #[test]
    fn eui_record_is_24_bytes() {
        let record = EuiRecord::new(FormatVersion::USER_SIGNATURE, ts(), Eui64::new(1));
        let bytes = record.encode();
        assert_eq!(bytes.len(), 24);
        assert_eq!(&bytes[14..22], &1u64.to_be_bytes());
        assert!(crc::verify(&bytes));
    }

    #[test]
    fn eui_record_roundtrip() {
        let record =
            EuiRecord::new(FormatVersion::USER_SIGNATURE, ts(), Eui64::new(0x70b3_d5a4_e000_0001));
        assert_eq!(EuiRecord::decode(&record.encode()).unwrap(), record);
    }

    #[test]
    fn component_record_layout() {
        let record =
            ComponentRecord::new(FormatVersion::USER_SIGNATURE, ts(), &board_spec()).unwrap();
        let bytes = record.encode();
        assert_eq!(bytes.len(), 86);
        assert_eq!(bytes[5], RecordType::Board.tag());
        assert_eq!(&bytes[14..30], board_spec().uuid.as_bytes());
        assert_eq!(&bytes[30..37], b"smenete");
        assert_eq!(&bytes[46..49], &[2, 1, 7]);
        assert_eq!(&bytes[49..56], b"SN-0042");
        assert_eq!(bytes[81], 0);
        assert_eq!(&bytes[82..84], &[0, 0]);
    }

    #[test]
    fn component_record_roundtrip_for_every_role() {
        for role in [ComponentRole::Board, ComponentRole::Platform, ComponentRole::Component] {
            let spec = ComponentSpec {
                role,
                position: 3,
                data_length: 512,
                ..board_spec()
            };
            let record = ComponentRecord::new(FormatVersion::USER_SIGNATURE, ts(), &spec).unwrap();
            let decoded = ComponentRecord::decode(&record.encode(), role).unwrap();
            assert_eq!(decoded, record);
            assert_eq!(decoded.role(), role);
            assert_eq!(decoded.name().as_text(), "smenete");
        }
    }

    #[test]
    fn name_bounds_are_enforced() {
        let mut spec = board_spec();
        spec.name = "ABCDEFGHIJKLMNOPQ".to_string();
        let err = ComponentRecord::new(FormatVersion::USER_SIGNATURE, ts(), &spec).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Validation(ValidationError::FieldTooLong { len: 17, max: 16, .. })
        ));

        spec.name = String::new();
        let err = ComponentRecord::new(FormatVersion::USER_SIGNATURE, ts(), &spec).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Validation(ValidationError::FieldRequired { field: "name" })
        ));
    }

    #[test]
    fn flipped_payload_byte_is_integrity_error() {
        let record = EuiRecord::new(FormatVersion::USER_SIGNATURE, ts(), Eui64::new(7));
        let mut bytes = record.encode();
        bytes[20] ^= 0x40;
        let err = Record::decode(&bytes).unwrap_err();
        assert!(matches!(err, RecordError::Integrity { offset: 0, .. }));
    }

    #[test]
    fn wrong_expected_type_is_rejected() {
        let record = EuiRecord::new(FormatVersion::USER_SIGNATURE, ts(), Eui64::new(7));
        let err = ComponentRecord::decode(&record.encode(), ComponentRole::Board).unwrap_err();
        assert!(matches!(
            err,
            RecordError::UnexpectedRecordType {
                expected: RecordType::Board,
                found: 0
            }
        ));
    }

    #[test]
    fn mismatched_declared_size_is_malformed() {
        let record = EuiRecord::new(FormatVersion::USER_SIGNATURE, ts(), Eui64::new(7));
        let mut bytes = record.encode();
        bytes[3..5].copy_from_slice(&86u16.to_be_bytes());
        let err = Record::decode(&bytes).unwrap_err();
        assert!(matches!(err, RecordError::MalformedHeader { .. }));
    }

    #[test]
    fn unknown_type_is_reported_with_tag() {
        let mut bytes = EuiRecord::new(FormatVersion::USER_SIGNATURE, ts(), Eui64::new(7)).encode();
        bytes[5] = 0x2A;
        let err = Record::decode(&bytes).unwrap_err();
        assert!(matches!(err, RecordError::UnknownRecordType { tag: 0x2A, .. }));
    }

    #[test]
    fn truncated_record_is_reported() {
        let bytes = EuiRecord::new(FormatVersion::USER_SIGNATURE, ts(), Eui64::new(7)).encode();
        let err = Record::decode(&bytes[..20]).unwrap_err();
        assert!(matches!(
            err,
            RecordError::Truncated {
                needed: 24,
                available: 20,
                ..
            }
        ));
    }
}
