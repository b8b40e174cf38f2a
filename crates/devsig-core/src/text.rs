//! # Fixed-Width Record Text
//!
//! Names and serials occupy 16-byte fields on the device. Values are
//! left-justified and NUL-padded; a value of exactly 16 bytes has no
//! terminator. Readers stop at the first NUL.

use std::fmt;

use uuid::Uuid;

use crate::error::ValidationError;

/// Width in bytes of every name, serial and UUID field.
pub const FIELD_WIDTH: usize = 16;

/// A NUL-padded byte field of width `N`.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedText<const N: usize>([u8; N]);

impl<const N: usize> FixedText<N> {
    /// Store `value`, padding with NUL bytes. Empty values are allowed.
    ///
    /// # Errors
    ///
    /// [`ValidationError::FieldTooLong`] if `value` is longer than `N` bytes.
    pub fn new(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        let bytes = value.as_bytes();
        if bytes.len() > N {
            return Err(ValidationError::FieldTooLong {
                field,
                len: bytes.len(),
                max: N,
            });
        }
        let mut raw = [0u8; N];
        raw[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(raw))
    }

    /// Like [`FixedText::new`], but an empty value is rejected with
    /// [`ValidationError::FieldRequired`].
    pub fn required(field: &'static str, value: &str) -> Result<Self, ValidationError> {
        if value.is_empty() {
            return Err(ValidationError::FieldRequired { field });
        }
        Self::new(field, value)
    }

    /// Wrap raw field bytes read from the wire.
    pub const fn from_raw(raw: [u8; N]) -> Self {
        Self(raw)
    }

    /// The raw field bytes, including padding.
    pub const fn as_raw(&self) -> &[u8; N] {
        &self.0
    }

    /// The bytes before the first NUL.
    pub fn trimmed(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(N);
        &self.0[..end]
    }

    /// The value as text, trimmed at the first NUL. Invalid UTF-8 is
    /// replaced rather than rejected since the bytes come from devices.
    pub fn as_text(&self) -> String {
        String::from_utf8_lossy(self.trimmed()).into_owned()
    }

    /// Whether no bytes precede the first NUL.
    pub fn is_empty(&self) -> bool {
        self.trimmed().is_empty()
    }
}

impl<const N: usize> fmt::Debug for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedText({:?})", self.as_text())
    }
}

impl<const N: usize> fmt::Display for FixedText<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// A component serial number: either a UUID or printable ASCII, both stored
/// in a 16-byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SerialNumber([u8; FIELD_WIDTH]);

impl SerialNumber {
    /// Serial given as a UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(*id.as_bytes())
    }

    /// Serial given as ASCII text, NUL-padded.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::NotPrintableAscii`] for anything [`Self::as_text`]
    ///   would not read back as text.
    /// - [`ValidationError::FieldTooLong`] if longer than 16 bytes.
    pub fn from_text(value: &str) -> Result<Self, ValidationError> {
        if !value.bytes().all(is_printable) {
            return Err(ValidationError::NotPrintableAscii {
                field: "serial",
                value: value.to_string(),
            });
        }
        let text = FixedText::<FIELD_WIDTH>::new("serial", value)?;
        Ok(Self(*text.as_raw()))
    }

    /// Parse a serial from user input: UUID text becomes a UUID serial,
    /// anything else is stored as text.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match Uuid::parse_str(value) {
            Ok(id) => Ok(Self::from_uuid(id)),
            Err(_) => Self::from_text(value),
        }
    }

    /// Wrap raw field bytes read from the wire.
    pub const fn from_raw(raw: [u8; FIELD_WIDTH]) -> Self {
        Self(raw)
    }

    /// The raw field bytes.
    pub const fn as_raw(&self) -> &[u8; FIELD_WIDTH] {
        &self.0
    }

    /// The serial as text if it looks like a NUL-padded printable ASCII
    /// string, otherwise `None`.
    pub fn as_text(&self) -> Option<String> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(FIELD_WIDTH);
        let (text, padding) = self.0.split_at(end);
        let printable = !text.is_empty() && text.iter().copied().all(is_printable);
        if printable && padding.iter().all(|&b| b == 0) {
            Some(String::from_utf8_lossy(text).into_owned())
        } else {
            None
        }
    }

    /// The serial interpreted as a UUID.
    pub fn as_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }
}

fn is_printable(b: u8) -> bool {
    b.is_ascii_graphic() || b == b' '
}

impl fmt::Display for SerialNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => f.write_str(&text),
            None => write!(f, "{}", self.as_uuid()),
        }
    }
}
