//! # devsig-cli — Device Provisioning CLI
//!
//! Provides the `devsig` command-line interface over the device-signature
//! libraries. Argument parsing and console output live here; every rule
//! about identifiers, records and licenses lives in the library crates.
//!
//! ## Subcommands
//!
//! - `devsig euigen` — Generate an EUI-64 ledger and display list for a range.
//! - `devsig usersig` — Allocate an identifier and write its user signature.
//! - `devsig license` — Sign Beatstack licenses for one or more identifiers.
//! - `devsig verify-license` — Check a license against a public key.
//! - `devsig inspect` — Decode a signature blob and print it as JSON.
//! - `devsig keygen` — Create a P-256 signing key pair.
//!
//! ```bash
//! devsig euigen --first 70B3D5A4E0000000 --last 70B3D5A4E00000FF
//! devsig usersig --boardname smenete --version 1.2.0
//! devsig license --euifile eui.txt --keyfile signing.pem --bstkconf beatstack.conf
//! ```
//!
//! Paths not given on the command line fall back to the YAML profile named
//! by `--config`, then to the built-in defaults in [`config`].

pub mod config;
pub mod euigen;
pub mod inspect;
pub mod keygen;
pub mod license;
pub mod usersig;
pub mod verify;

use anyhow::{Context, Result};
use devsig_core::Timestamp;

/// The `--timestamp` override, or the current time.
pub fn resolve_timestamp(timestamp: Option<i64>) -> Result<Timestamp> {
    match timestamp {
        Some(secs) => {
            Timestamp::from_unix(secs).with_context(|| format!("invalid --timestamp {secs}"))
        }
        None => Ok(Timestamp::now()),
    }
}
