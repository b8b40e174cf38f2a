//! # Provisioning Blob
//!
//! The signature written to one device: exactly one EUI-64 record followed
//! by its component records. The EUI-64 record always encodes first.

use devsig_core::Eui64;

use crate::error::RecordError;
use crate::record::{ComponentRecord, ComponentRole, EuiRecord, Record};
use crate::stream::{decode_many, encode_many};

/// One device's signature: identity plus components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningBlob {
    eui: EuiRecord,
    components: Vec<ComponentRecord>,
}

impl ProvisioningBlob {
    /// Blob with an identity record and no components.
    pub fn new(eui: EuiRecord) -> Self {
        Self {
            eui,
            components: Vec::new(),
        }
    }

    /// Append a component record.
    pub fn push(&mut self, component: ComponentRecord) {
        self.components.push(component);
    }

    /// Builder form of [`push`](Self::push).
    #[must_use]
    pub fn with_component(mut self, component: ComponentRecord) -> Self {
        self.push(component);
        self
    }

    /// The identity record.
    pub fn eui_record(&self) -> &EuiRecord {
        &self.eui
    }

    /// The device identifier.
    pub fn eui(&self) -> Eui64 {
        self.eui.eui()
    }

    /// Component records in encoding order.
    pub fn components(&self) -> &[ComponentRecord] {
        &self.components
    }

    /// The first board record, if any.
    pub fn board(&self) -> Option<&ComponentRecord> {
        self.components
            .iter()
            .find(|c| c.role() == ComponentRole::Board)
    }

    /// All records, identity first.
    pub fn records(&self) -> Vec<Record> {
        std::iter::once(Record::Eui(self.eui.clone()))
            .chain(self.components.iter().cloned().map(Record::Component))
            .collect()
    }

    /// Encoded signature bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        encode_many(&self.records())
    }

    /// Assemble a blob from decoded records.
    ///
    /// # Errors
    ///
    /// - [`RecordError::MissingEuiRecord`] if no identity record is present.
    /// - [`RecordError::DuplicateEuiRecord`] if more than one is present.
    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Result<Self, RecordError> {
        let mut eui: Option<EuiRecord> = None;
        let mut components = Vec::new();
        for record in records {
            match record {
                Record::Eui(e) => {
                    if let Some(first) = &eui {
                        return Err(RecordError::DuplicateEuiRecord {
                            first: first.eui(),
                            second: e.eui(),
                        });
                    }
                    eui = Some(e);
                }
                Record::Component(c) => components.push(c),
            }
        }
        let eui = eui.ok_or(RecordError::MissingEuiRecord)?;
        Ok(Self { eui, components })
    }

    /// Decode a signature area into a blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RecordError> {
        Self::from_records(decode_many(bytes)?)
    }
}
