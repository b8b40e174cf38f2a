//! # devsig-core — Foundational Types for Device Signatures
//!
//! This crate is the leaf of the device-signature workspace. It defines the
//! primitives every other crate builds on:
//!
//! 1. **[`Eui64`]** — the 64-bit device identity, with its three text forms:
//!    16 uppercase hex digits for ledgers, dash-separated octets for display,
//!    and the `EUI-64_{HEX}.bin` artifact filename.
//!
//! 2. **Explicit versions.** [`FormatVersion`] is threaded through record
//!    construction; nothing reads a process-wide version constant.
//!    [`ComponentVersion`] is the `major.minor.assembly` hardware revision.
//!
//! 3. **Fixed-width text.** [`FixedText`] and [`SerialNumber`] model the
//!    NUL-padded 16-byte fields of the on-device layout. Over-long or empty
//!    required values are rejected at construction, never truncated.
//!
//! 4. **UTC-only timestamps.** [`Timestamp`] holds whole seconds since the
//!    Unix epoch, which is all the wire format can carry.
//!
//! 5. **Atomic file staging.** [`StagedFile`] writes into a temporary file in
//!    the target directory and only replaces the target on `commit()`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `devsig-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod eui64;
pub mod fsutil;
pub mod temporal;
pub mod text;
pub mod version;

pub use error::ValidationError;
pub use eui64::Eui64;
pub use fsutil::{StagedFile, READ_ONLY_MODE, WORKING_COPY_MODE};
pub use temporal::Timestamp;
pub use text::{FixedText, SerialNumber, FIELD_WIDTH};
pub use version::{ComponentVersion, FormatVersion};
