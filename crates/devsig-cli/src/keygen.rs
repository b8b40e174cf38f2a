//! # Keygen Subcommand
//!
//! Writes a fresh P-256 key pair: the SEC1 private key the `license`
//! subcommand signs with, and the SPKI public key `verify-license` and
//! device firmware check against. Existing files are never replaced.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use devsig_core::StagedFile;
use devsig_crypto::P256Signer;

/// Owner-only permissions for the private key.
const PRIVATE_KEY_MODE: u32 = 0o600;

/// Public keys are readable by everyone.
const PUBLIC_KEY_MODE: u32 = 0o644;

/// Arguments for the `keygen` subcommand.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Private key output, SEC1 PEM.
    #[arg(long = "keyout")]
    pub key_out: PathBuf,

    /// Public key output, SPKI PEM. Defaults to the key path with `.pub`
    /// appended.
    #[arg(long = "pubout")]
    pub pub_out: Option<PathBuf>,
}

impl KeygenArgs {
    fn public_path(&self) -> PathBuf {
        self.pub_out.clone().unwrap_or_else(|| {
            let mut name = self.key_out.clone().into_os_string();
            name.push(".pub");
            PathBuf::from(name)
        })
    }
}

/// Write `contents` to `path` with `mode`, refusing to replace an existing
/// file.
fn write_new(path: &Path, contents: &str, mode: u32) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    StagedFile::stage(path, contents.as_bytes(), Some(mode))
        .and_then(StagedFile::commit_new)
        .with_context(|| format!("failed to create {}", path.display()))
}

/// Execute the `keygen` subcommand.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let pub_out = args.public_path();
    anyhow::ensure!(
        !args.key_out.exists(),
        "refusing to overwrite existing key {}",
        args.key_out.display()
    );
    anyhow::ensure!(
        !pub_out.exists(),
        "refusing to overwrite existing public key {}",
        pub_out.display()
    );

    let signer = P256Signer::generate();
    let private_pem = signer.to_sec1_pem()?;
    let public_pem = signer.public_key_pem()?;

    write_new(&args.key_out, &private_pem, PRIVATE_KEY_MODE)?;
    write_new(&pub_out, &public_pem, PUBLIC_KEY_MODE)?;
    tracing::info!(
        key = %args.key_out.display(),
        public = %pub_out.display(),
        "generated P-256 key pair"
    );

    println!("Private key: {}", args.key_out.display());
    println!("Public key:  {}", pub_out.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use devsig_core::{Eui64, Timestamp};
    use devsig_crypto::{BeatstackParams, LicenseVerifier, SignedLicense};

    #[test]
    fn writes_loadable_pair() {
        let dir = tempfile::tempdir().unwrap();
        let args = KeygenArgs {
            key_out: dir.path().join("keys").join("signing.pem"),
            pub_out: None,
        };
        assert_eq!(run_keygen(&args).unwrap(), 0);

        let signer = P256Signer::from_pem_file(&args.key_out).unwrap();
        let public = dir.path().join("keys").join("signing.pem.pub");
        let verifier = LicenseVerifier::from_pem_file(&public).unwrap();
        let license = SignedLicense::issue(
            &signer,
            Eui64::new(0x70B3_D5A4_E000_0001),
            Timestamp::from_unix(1_704_067_200).unwrap(),
            BeatstackParams::default(),
        )
        .unwrap();
        license.verify(&verifier).unwrap();
    }

    #[test]
    fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let key_out = dir.path().join("signing.pem");
        fs::write(&key_out, "keep me").unwrap();
        let args = KeygenArgs { key_out: key_out.clone(), pub_out: None };
        assert!(run_keygen(&args).is_err());
        assert_eq!(fs::read_to_string(&key_out).unwrap(), "keep me");
        assert!(!dir.path().join("signing.pem.pub").exists());
    }

    #[cfg(unix)]
    #[test]
    fn private_key_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let args = KeygenArgs {
            key_out: dir.path().join("signing.pem"),
            pub_out: Some(dir.path().join("signing.pub.pem")),
        };
        run_keygen(&args).unwrap();
        let mode = fs::metadata(&args.key_out).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }
}
