//! # Record Stream
//!
//! A signature area is a plain concatenation of records with no outer
//! header. Boundaries are found by reading each record's declared size.
//!
//! ## Termination
//!
//! Signature areas are usually larger than the data written to them and the
//! remainder is fill (typically erased flash, `0xFF`). The decoder is
//! therefore asymmetric:
//!
//! - If the **first** record cannot be framed, nothing was recovered and the
//!   whole decode fails with [`RecordError::MalformedHeader`].
//! - Once at least one record has been framed, a record that cannot be
//!   framed (unreadable header, size out of range or not matching its type,
//!   running past the end of the buffer) marks the end of data.
//! - A record that frames correctly but fails its CRC is always an
//!   [`RecordError::Integrity`] failure, wherever it sits.
//! - Records with an unknown type tag are skipped by their declared size.
//!   Data holding no record of a known type fails like unframeable data.

use crate::error::RecordError;
use crate::header::{BaseHeader, RecordType};
use crate::record::Record;

/// Concatenate the encodings of `records` in the given order.
pub fn encode_many<'a, I>(records: I) -> Vec<u8>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut out = Vec::new();
    for record in records {
        out.extend_from_slice(&record.encode());
    }
    out
}

/// Walk `bytes` record by record.
///
/// # Errors
///
/// - [`RecordError::MalformedHeader`] if no record can be framed at offset 0
///   or no record of a known type was found.
/// - [`RecordError::Integrity`] if any framed record fails its CRC.
pub fn decode_many(bytes: &[u8]) -> Result<Vec<Record>, RecordError> {
    let mut records = Vec::new();
    let mut offset = 0;
    let mut framed = 0usize;

    loop {
        if offset >= bytes.len() {
            if framed == 0 {
                return Err(RecordError::MalformedHeader {
                    offset,
                    reason: "no record data".to_string(),
                });
            }
            break;
        }

        let header = match BaseHeader::decode_at(bytes, offset) {
            Ok(header) => header,
            Err(e) => {
                if framed == 0 {
                    return Err(into_malformed(e, offset));
                }
                tracing::debug!(offset, error = %e, "treating unreadable tail as padding");
                break;
            }
        };

        if header.kind().is_none() {
            let end = offset + header.record_len();
            if end > bytes.len() {
                if framed == 0 {
                    return Err(RecordError::MalformedHeader {
                        offset,
                        reason: format!(
                            "record of unknown type {} runs past end of data",
                            header.record_type
                        ),
                    });
                }
                tracing::debug!(offset, "unknown record runs past end of data; stopping");
                break;
            }
            tracing::debug!(
                offset,
                tag = header.record_type,
                size = header.size,
                "skipping record of unknown type"
            );
            offset = end;
            framed += 1;
            continue;
        }

        match Record::decode_at(bytes, offset) {
            Ok(record) => {
                tracing::trace!(offset, kind = %record.record_type(), "decoded record");
                records.push(record);
                offset += header.record_len();
                framed += 1;
            }
            Err(e @ RecordError::Integrity { .. }) => return Err(e),
            Err(e) if framed == 0 => return Err(into_malformed(e, offset)),
            Err(e) => {
                tracing::debug!(offset, error = %e, "treating unframeable tail as padding");
                break;
            }
        }
    }

    if records.is_empty() {
        return Err(RecordError::MalformedHeader {
            offset: 0,
            reason: "no known record in data".to_string(),
        });
    }
    Ok(records)
}

/// Report a framing failure of the first record as a malformed header.
fn into_malformed(e: RecordError, offset: usize) -> RecordError {
    match e {
        RecordError::MalformedHeader { .. } => e,
        other => RecordError::MalformedHeader {
            offset,
            reason: other.to_string(),
        },
    }
}
