//! # Verify-License Subcommand
//!
//! Splits a license file into its pre-signing record and `r || s`, and
//! checks the signature against an SPKI public key.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use devsig_crypto::{LicenseVerifier, LicenseView, SignedLicense};

use crate::config::{require, Profile};

/// Arguments for the `verify-license` subcommand.
#[derive(Args, Debug)]
pub struct VerifyLicenseArgs {
    /// License file to check.
    pub license: PathBuf,

    /// Public key, SPKI PEM.
    #[arg(long)]
    pub pubkey: Option<PathBuf>,

    /// Print the decoded license as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `verify-license` subcommand.
///
/// Returns exit code 2 when the file decodes but the signature does not
/// verify.
pub fn run_verify_license(args: &VerifyLicenseArgs, profile: &Profile) -> Result<u8> {
    let pubkey = require(args.pubkey.as_deref(), profile.pubkey.as_ref(), "pubkey")?;
    let verifier = LicenseVerifier::from_pem_file(&pubkey).context("failed to load public key")?;

    let bytes = fs::read(&args.license)
        .with_context(|| format!("failed to read {}", args.license.display()))?;
    let license = SignedLicense::from_bytes(&bytes)
        .with_context(|| format!("failed to decode license {}", args.license.display()))?;

    if args.json {
        let view = LicenseView::from(&license);
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    match license.verify(&verifier) {
        Ok(()) => {
            println!("OK: license for {} verifies", license.eui());
            Ok(0)
        }
        Err(e) => {
            println!("FAILED: {e}");
            Ok(2)
        }
    }
}
