//! # Euigen Subcommand
//!
//! Creates a fresh identifier ledger and its display list for an inclusive
//! EUI-64 range. Neither file may exist beforehand.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use devsig_core::{Eui64, Timestamp};
use devsig_pool::{generate_range, RangeOutputs};

use crate::config::{resolve, Profile, DEFAULT_LEDGER, DEFAULT_LIST};

/// Arguments for the `euigen` subcommand.
#[derive(Args, Debug)]
pub struct EuigenArgs {
    /// First identifier of the range, 16 hex digits.
    #[arg(long)]
    pub first: Eui64,

    /// Last identifier of the range, inclusive.
    #[arg(long)]
    pub last: Eui64,

    /// Ledger file to create.
    #[arg(long = "euiout")]
    pub ledger: Option<PathBuf>,

    /// Display list file to create.
    #[arg(long = "listout")]
    pub list: Option<PathBuf>,
}

/// Execute the `euigen` subcommand.
pub fn run_euigen(args: &EuigenArgs, profile: &Profile) -> Result<u8> {
    let outputs = RangeOutputs {
        ledger: resolve(args.ledger.as_deref(), profile.ledger.as_ref(), DEFAULT_LEDGER),
        list: resolve(args.list.as_deref(), profile.list.as_ref(), DEFAULT_LIST),
    };

    let summary = generate_range(args.first, args.last, &outputs, Timestamp::now())
        .with_context(|| {
            format!("failed to generate EUI-64 range {} - {}", args.first, args.last)
        })?;

    println!("EUI-64 range: {} - {}", args.first.printable(), args.last.printable());
    println!("Entries:      {} ({} reserved)", summary.entries, summary.reserved);
    println!("Ledger:       {}", outputs.ledger.display());
    println!("List:         {}", outputs.list.display());
    Ok(0)
}
