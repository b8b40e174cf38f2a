//! # Usersig Subcommand
//!
//! Issues the user signature for the next device on the line: takes the
//! first free identifier from the ledger, writes an EUI-64 record plus a
//! board record to `<sigdir>/EUI-64_<HEX>.bin` (read-only), marks the
//! ledger entry, and refreshes the working copy the flashing step reads.
//!
//! Allocation, the signature write and the ledger mark run under the
//! ledger lease, so two stations sharing a ledger cannot issue the same
//! identifier.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use uuid::Uuid;

use devsig_core::{ComponentVersion, FormatVersion, SerialNumber, Timestamp};
use devsig_pool::{Annotation, IdentifierPool};
use devsig_record::{
    write_working_copy, ComponentRecord, ComponentRole, ComponentSpec, EuiRecord,
    ProvisioningBlob, SignatureStore,
};

use crate::config::{resolve, Profile, DEFAULT_LEDGER, DEFAULT_SIGDIR, DEFAULT_SIGOUT};
use crate::resolve_timestamp;

/// Arguments for the `usersig` subcommand.
#[derive(Args, Debug)]
pub struct UsersigArgs {
    /// Board name, 1 to 16 bytes.
    #[arg(long = "boardname")]
    pub board_name: String,

    /// Board version as MAJOR.MINOR.ASSEMBLY.
    #[arg(long = "version")]
    pub board_version: ComponentVersion,

    /// UUID of the board design.
    #[arg(long)]
    pub board_uuid: Option<Uuid>,

    /// UUID of the board manufacturer.
    #[arg(long)]
    pub manufacturer: Option<Uuid>,

    /// Board serial number: a UUID, or up to 16 bytes of text.
    #[arg(long, value_parser = SerialNumber::parse)]
    pub serial: Option<SerialNumber>,

    /// Board position among identical boards in one device.
    #[arg(long, default_value_t = 0)]
    pub position: u8,

    /// Use this Unix timestamp instead of the current time.
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Identifier ledger to allocate from.
    #[arg(long = "euifile")]
    pub ledger: Option<PathBuf>,

    /// Directory of per-device signature files.
    #[arg(long)]
    pub sigdir: Option<PathBuf>,

    /// Working copy of the new signature.
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl UsersigArgs {
    fn board_spec(&self, profile: &Profile) -> ComponentSpec {
        let mut spec =
            ComponentSpec::new(ComponentRole::Board, self.board_name.clone(), self.board_version);
        spec.uuid = self.board_uuid.unwrap_or_else(Uuid::nil);
        spec.manufacturer = self
            .manufacturer
            .or(profile.manufacturer)
            .unwrap_or_else(Uuid::nil);
        spec.serial = self.serial.unwrap_or_default();
        spec.position = self.position;
        spec
    }
}

/// Ledger annotation for an issued board:
/// `name,version,unix_time[,board_uuid,manufacturer_uuid]`.
///
/// The UUID pair is written whenever either is set, with a nil UUID left
/// empty, so each keeps its column.
pub fn board_annotation(spec: &ComponentSpec, created: Timestamp) -> Result<Annotation> {
    let mut parts = vec![spec.name.clone(), spec.version.to_string(), created.unix().to_string()];
    if !(spec.uuid.is_nil() && spec.manufacturer.is_nil()) {
        for id in [spec.uuid, spec.manufacturer] {
            parts.push(if id.is_nil() { String::new() } else { id.to_string() });
        }
    }
    Ok(Annotation::new(parts.join(","))?)
}

/// Execute the `usersig` subcommand.
pub fn run_usersig(args: &UsersigArgs, profile: &Profile) -> Result<u8> {
    let ledger = resolve(args.ledger.as_deref(), profile.ledger.as_ref(), DEFAULT_LEDGER);
    let store = SignatureStore::new(resolve(
        args.sigdir.as_deref(),
        profile.sigdir.as_ref(),
        DEFAULT_SIGDIR,
    ));
    let out = resolve(args.out.as_deref(), profile.sigout.as_ref(), DEFAULT_SIGOUT);
    let created = resolve_timestamp(args.timestamp)?;

    // Field errors surface before an identifier is touched.
    let spec = args.board_spec(profile);
    let board = ComponentRecord::new(FormatVersion::USER_SIGNATURE, created, &spec)
        .context("invalid board description")?;
    let annotation = board_annotation(&spec, created)?;

    let pool = IdentifierPool::new(&ledger);
    let (eui, (path, bytes)) = pool
        .issue(|eui| -> Result<_> {
            store.check_available(eui)?;
            let eui_record = EuiRecord::new(FormatVersion::USER_SIGNATURE, created, eui);
            let blob = ProvisioningBlob::new(eui_record).with_component(board);
            let bytes = blob.to_bytes();
            let path = store.store(eui, &bytes, false)?;
            Ok(((path, bytes), annotation))
        })
        .with_context(|| format!("failed to issue a user signature from {}", ledger.display()))?;

    write_working_copy(&out, &bytes)
        .with_context(|| format!("failed to write working copy {}", out.display()))?;
    let remaining = pool
        .load()
        .with_context(|| format!("failed to re-read {}", ledger.display()))?
        .available_count();
    if remaining == 0 {
        tracing::warn!(ledger = %ledger.display(), "identifier ledger is exhausted");
    }

    println!("EUI-64:    {eui}");
    println!("Board:     {} {}", spec.name, spec.version);
    println!("Time:      {} ({})", created.unix(), created.to_display_string());
    println!("Stored:    {}", path.display());
    println!("Output:    {}", out.display());
    println!("Remaining: {remaining}");
    Ok(0)
}
