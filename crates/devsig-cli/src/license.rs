//! # License Subcommand
//!
//! Signs Beatstack licenses with a P-256 key.
//!
//! Identifiers come either from `--eui` (a single override, which replaces
//! an existing license for that device) or from a ledger file (every data
//! line, annotated or not, except reserved boundary values; an existing
//! license stops the run). Each license is stored read-only as
//! `<licdir>/EUI-64_<HEX>.bin` and the last one is also written to the
//! working copy.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use devsig_core::{Eui64, FormatVersion, Timestamp};
use devsig_crypto::{BeatstackParams, LicenseSigner, P256Signer, SignedLicense};
use devsig_pool::IdentifierPool;
use devsig_record::{write_working_copy, SignatureStore};

use crate::config::{require, resolve, Profile, DEFAULT_LEDGER, DEFAULT_LICDIR, DEFAULT_LICOUT};
use crate::resolve_timestamp;

/// Arguments for the `license` subcommand.
#[derive(Args, Debug)]
pub struct LicenseArgs {
    /// License a single identifier, replacing any existing license for it.
    #[arg(long, conflicts_with = "euifile")]
    pub eui: Option<Eui64>,

    /// License every identifier listed in this ledger.
    #[arg(long)]
    pub euifile: Option<PathBuf>,

    /// P-256 private key, SEC1 or PKCS#8 PEM.
    #[arg(long)]
    pub keyfile: Option<PathBuf>,

    /// Beatstack configuration file with the licensed sizing.
    #[arg(long)]
    pub bstkconf: Option<PathBuf>,

    /// Use this Unix timestamp instead of the current time.
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Directory of per-device license files.
    #[arg(long)]
    pub licdir: Option<PathBuf>,

    /// Working copy of the last license written.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

/// Identifiers a ledger asks to license, in file order.
pub fn ledger_identifiers(path: &Path) -> Result<Vec<Eui64>> {
    let ledger = IdentifierPool::new(path).load()?;
    let mut ids = Vec::new();
    for eui in ledger.identifiers() {
        if eui.is_reserved() {
            tracing::debug!(eui = %eui, "not licensing reserved identifier");
            continue;
        }
        ids.push(eui);
    }
    Ok(ids)
}

/// Execute the `license` subcommand.
pub fn run_license(args: &LicenseArgs, profile: &Profile) -> Result<u8> {
    let keyfile = require(args.keyfile.as_deref(), profile.keyfile.as_ref(), "keyfile")?;
    let bstkconf = require(args.bstkconf.as_deref(), profile.bstkconf.as_ref(), "bstkconf")?;
    let store = SignatureStore::new(resolve(
        args.licdir.as_deref(),
        profile.licdir.as_ref(),
        DEFAULT_LICDIR,
    ));
    let out = resolve(args.out.as_deref(), profile.licout.as_ref(), DEFAULT_LICOUT);
    let created = resolve_timestamp(args.timestamp)?;

    let params = BeatstackParams::from_config_file(&bstkconf)
        .context("failed to load Beatstack configuration")?;
    let signer = P256Signer::from_pem_file(&keyfile).context("failed to load signing key")?;

    let (ids, overwrite) = match args.eui {
        Some(eui) => (vec![eui], true),
        None => {
            let ledger = resolve(args.euifile.as_deref(), profile.ledger.as_ref(), DEFAULT_LEDGER);
            let ids = ledger_identifiers(&ledger)
                .with_context(|| format!("failed to read identifiers from {}", ledger.display()))?;
            (ids, false)
        }
    };
    anyhow::ensure!(!ids.is_empty(), "no identifiers to license");

    let mut last = None;
    for eui in &ids {
        let license = issue_one(&signer, &store, *eui, created, params, overwrite)?;
        last = Some(license);
    }
    if let Some(license) = last {
        write_working_copy(&out, &license.to_bytes())
            .with_context(|| format!("failed to write working copy {}", out.display()))?;
    }

    println!("Generator: {}", FormatVersion::LICENSE_GENERATOR);
    println!("Timestamp: {} ({})", created.unix(), created.to_display_string());
    println!(
        "Beatstack: {} clusters, {} nodes per cluster, {} partnerships",
        params.clusters, params.nodes_in_cluster, params.partnerships
    );
    println!("Licensed:  {} identifier(s) into {}", ids.len(), store.dir().display());
    println!("Output:    {}", out.display());
    Ok(0)
}

fn issue_one(
    signer: &dyn LicenseSigner,
    store: &SignatureStore,
    eui: Eui64,
    created: Timestamp,
    params: BeatstackParams,
    overwrite: bool,
) -> Result<SignedLicense> {
    if !overwrite {
        store.check_available(eui)?;
    }
    let license = SignedLicense::issue(signer, eui, created, params)
        .with_context(|| format!("failed to sign license for {eui}"))?;
    let path = store.store(eui, &license.to_bytes(), overwrite)?;
    tracing::info!(eui = %eui, path = %path.display(), "wrote license");
    Ok(license)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn ledger_identifiers_skip_reserved_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eui.txt");
        fs::write(
            &path,
            "# range\n70B3D5A4E0000000,RESERVED\n\
             70B3D5A4E0000001,smenete,1.0.0,1704067200\n70B3D5A4E0000002,\n",
        )
        .unwrap();
        let ids = ledger_identifiers(&path).unwrap();
        assert_eq!(
            ids,
            vec![Eui64::new(0x70B3_D5A4_E000_0001), Eui64::new(0x70B3_D5A4_E000_0002)]
        );
    }
}
