//! # devsig CLI entry point
//!
//! Parses command-line arguments, loads the optional provisioning profile
//! and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use devsig_cli::config::Profile;
use devsig_cli::euigen::{run_euigen, EuigenArgs};
use devsig_cli::inspect::{run_inspect, InspectArgs};
use devsig_cli::keygen::{run_keygen, KeygenArgs};
use devsig_cli::license::{run_license, LicenseArgs};
use devsig_cli::usersig::{run_usersig, UsersigArgs};
use devsig_cli::verify::{run_verify_license, VerifyLicenseArgs};

/// Device provisioning toolchain.
///
/// Allocates EUI-64 identifiers from a ledger, writes the signature records
/// firmware reads at boot, and signs Beatstack licenses.
#[derive(Parser, Debug)]
#[command(name = "devsig", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Provisioning profile (YAML) with default paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an identifier ledger and display list for an EUI-64 range.
    Euigen(EuigenArgs),

    /// Allocate the next identifier and write its user signature.
    Usersig(UsersigArgs),

    /// Sign Beatstack licenses for one or more identifiers.
    License(LicenseArgs),

    /// Check a license file against a public key.
    VerifyLicense(VerifyLicenseArgs),

    /// Decode a signature blob and print its records as JSON.
    Inspect(InspectArgs),

    /// Generate a P-256 signing key pair.
    Keygen(KeygenArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "devsig starting");

    let result =
        Profile::load_optional(cli.config.as_deref()).and_then(|profile| match &cli.command {
            Commands::Euigen(args) => run_euigen(args, &profile),
            Commands::Usersig(args) => run_usersig(args, &profile),
            Commands::License(args) => run_license(args, &profile),
            Commands::VerifyLicense(args) => run_verify_license(args, &profile),
            Commands::Inspect(args) => run_inspect(args),
            Commands::Keygen(args) => run_keygen(args),
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
