//! # Inspect Subcommand
//!
//! Decodes a signature blob, as stored or as read back from a device's
//! signature area including any fill after the last record, and prints the
//! records as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use devsig_record::{decode_many, render_json, ProvisioningBlob};

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Signature blob to decode.
    pub file: PathBuf,

    /// Also require exactly one EUI-64 record.
    #[arg(long)]
    pub strict: bool,
}

/// Execute the `inspect` subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let bytes = fs::read(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let records = decode_many(&bytes)
        .with_context(|| format!("failed to decode {}", args.file.display()))?;
    tracing::debug!(
        file = %args.file.display(),
        records = records.len(),
        "decoded signature blob"
    );

    if args.strict {
        let blob = ProvisioningBlob::from_records(records.iter().cloned())
            .with_context(|| format!("{} is not a provisioning blob", args.file.display()))?;
        tracing::info!(
            eui = %blob.eui(),
            components = blob.components().len(),
            "blob is well formed"
        );
    }

    println!("{}", render_json(&records)?);
    Ok(0)
}
