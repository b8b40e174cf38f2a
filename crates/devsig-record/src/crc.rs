//! # CRC Guard
//!
//! Every record ends with a 16-bit CRC computed over its header and payload
//! and stored big-endian. The variant is CRC-16/XMODEM (polynomial 0x1021,
//! initial value 0x0000, no reflection, no final XOR), which is what the
//! device firmware validates. It is a fixed external contract.

use crc::{Crc, CRC_16_XMODEM};

use crate::header::CRC_LEN;

const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_XMODEM);

/// CRC of `bytes`.
pub fn checksum(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}

/// Append the big-endian CRC of everything already in `buf`.
pub fn append(buf: &mut Vec<u8>) {
    let crc = checksum(buf);
    buf.extend_from_slice(&crc.to_be_bytes());
}

/// Split off the trailing CRC and compare it with one recomputed over the
/// preceding bytes. Returns `(stored, computed)` on mismatch.
pub fn check(bytes_with_crc: &[u8]) -> Result<(), (u16, u16)> {
    if bytes_with_crc.len() < CRC_LEN {
        return Err((0, 0));
    }
    let (body, trailer) = bytes_with_crc.split_at(bytes_with_crc.len() - CRC_LEN);
    let stored = u16::from_be_bytes([trailer[0], trailer[1]]);
    let computed = checksum(body);
    if stored == computed {
        Ok(())
    } else {
        Err((stored, computed))
    }
}

/// Whether the trailing CRC of `bytes_with_crc` matches its contents.
pub fn verify(bytes_with_crc: &[u8]) -> bool {
    check(bytes_with_crc).is_ok()
}
