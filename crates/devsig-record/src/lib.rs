//! # devsig-record — Device Signature Record Format
//!
//! Encodes and decodes the byte-exact records that firmware reads from a
//! device's signature area:
//!
//! - **CRC Guard** ([`crc`]) — CRC-16/XMODEM appended big-endian to every
//!   record.
//! - **Record Codec** ([`header`], [`record`]) — a 14-byte [`BaseHeader`]
//!   followed by a payload whose shape is chosen by the header's type tag.
//! - **Record Stream** ([`stream`]) — concatenation without separators, and
//!   a decoder that walks records by declared size and treats an unreadable
//!   tail after the first record as padding.
//! - **Provisioning Blob** ([`blob`]) — exactly one EUI-64 record plus
//!   zero or more component records.
//! - **Inspection** ([`inspect`]) — decoded records as plain JSON values.
//! - **Signature Store** ([`store`]) — immutable `EUI-64_{HEX}.bin` files.
//!
//! ## Wire Layout
//!
//! All integers are big-endian with no implicit padding:
//!
//! ```text
//! BaseHeader   major u8 | minor u8 | patch u8 | size u16 | type u8 | created i64
//! EuiRecord    BaseHeader | eui u64 | crc u16                            (24 bytes)
//! Component    BaseHeader | uuid[16] | name[16] | major u8 | minor u8    (86 bytes)
//!              | assembly u8 | serial[16] | manufacturer[16] | position u8
//!              | data_length u16 | crc u16
//! ```
//!
//! Records are immutable once built. A correction is a new record.

pub mod blob;
pub mod crc;
pub mod error;
pub mod header;
pub mod inspect;
pub mod record;
pub mod store;
pub mod stream;

mod wire;

pub use blob::ProvisioningBlob;
pub use error::{RecordError, StoreError};
pub use header::{BaseHeader, RecordType, CRC_LEN, HEADER_LEN, MAX_RECORD_SIZE};
pub use inspect::{render_json, RecordView};
pub use record::{ComponentRecord, ComponentRole, ComponentSpec, EuiRecord, Record};
pub use store::{write_working_copy, SignatureStore};
pub use stream::{decode_many, encode_many};
