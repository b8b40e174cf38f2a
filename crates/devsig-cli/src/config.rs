//! # Provisioning Profile
//!
//! A YAML file passed with `--config` that supplies default paths for a
//! provisioning station, so operators do not repeat them on every run:
//!
//! ```yaml
//! ledger: /srv/provisioning/eui.txt
//! sigdir: /srv/provisioning/sigdata
//! licdir: /srv/provisioning/licensedata
//! keyfile: /etc/devsig/signing.pem
//! bstkconf: /srv/provisioning/beatstack.conf
//! manufacturer: 6ba7b810-9dad-11d1-80b4-00c04fd430c8
//! ```
//!
//! Precedence is command-line flag, then profile, then the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default identifier ledger.
pub const DEFAULT_LEDGER: &str = "eui.txt";
/// Default display list written by `euigen`.
pub const DEFAULT_LIST: &str = "list.txt";
/// Default directory of per-device signature files.
pub const DEFAULT_SIGDIR: &str = "sigdata";
/// Default working copy of the latest user signature.
pub const DEFAULT_SIGOUT: &str = "sigdata.bin";
/// Default directory of per-device license files.
pub const DEFAULT_LICDIR: &str = "licensedata";
/// Default working copy of the latest license.
pub const DEFAULT_LICOUT: &str = "license.bin";

/// Station defaults loaded from YAML. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Profile {
    pub ledger: Option<PathBuf>,
    pub list: Option<PathBuf>,
    pub sigdir: Option<PathBuf>,
    pub sigout: Option<PathBuf>,
    pub licdir: Option<PathBuf>,
    pub licout: Option<PathBuf>,
    pub keyfile: Option<PathBuf>,
    pub pubkey: Option<PathBuf>,
    pub bstkconf: Option<PathBuf>,
    /// Manufacturer written into board records when `--manufacturer` is
    /// not given.
    pub manufacturer: Option<Uuid>,
}

impl Profile {
    /// Parse profile YAML. An empty document is the empty profile.
    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Read and parse a profile file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read profile {}", path.display()))?;
        let profile = Self::from_yaml_str(&text)
            .with_context(|| format!("failed to parse profile {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded provisioning profile");
        Ok(profile)
    }

    /// The profile at `path`, or the empty profile when none was given.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Pick the flag, else the profile value, else `default`.
pub fn resolve(flag: Option<&Path>, profile: Option<&PathBuf>, default: &str) -> PathBuf {
    flag.map(Path::to_path_buf)
        .or_else(|| profile.cloned())
        .unwrap_or_else(|| PathBuf::from(default))
}

/// Pick the flag, else the profile value; fail naming `flag_name` if neither
/// is set.
pub fn require(flag: Option<&Path>, profile: Option<&PathBuf>, flag_name: &str) -> Result<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| profile.cloned())
        .with_context(|| {
            format!("--{flag_name} is required (on the command line or in the profile)")
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_profile() {
        let profile = Profile::from_yaml_str(
            "ledger: /srv/eui.txt\nkeyfile: /etc/devsig/key.pem\n\
             manufacturer: 6ba7b810-9dad-11d1-80b4-00c04fd430c8\n",
        )
        .unwrap();
        assert_eq!(profile.ledger, Some(PathBuf::from("/srv/eui.txt")));
        assert_eq!(profile.keyfile, Some(PathBuf::from("/etc/devsig/key.pem")));
        assert_eq!(
            profile.manufacturer,
            Some(Uuid::parse_str("6ba7b810-9dad-11d1-80b4-00c04fd430c8").unwrap())
        );
        assert!(profile.sigdir.is_none());
    }

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Profile::from_yaml_str("").unwrap(), Profile::default());
        assert_eq!(Profile::from_yaml_str("  \n").unwrap(), Profile::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(Profile::from_yaml_str("ledgr: eui.txt\n").is_err());
    }

    #[test]
    fn flag_beats_profile_beats_default() {
        let from_profile = PathBuf::from("profile.txt");
        assert_eq!(
            resolve(Some(Path::new("flag.txt")), Some(&from_profile), DEFAULT_LEDGER),
            PathBuf::from("flag.txt")
        );
        assert_eq!(resolve(None, Some(&from_profile), DEFAULT_LEDGER), from_profile);
        assert_eq!(resolve(None, None, DEFAULT_LEDGER), PathBuf::from("eui.txt"));
    }

    #[test]
    fn require_names_the_flag() {
        let err = require(None, None, "keyfile").unwrap_err();
        assert!(err.to_string().contains("--keyfile"));
    }

    #[test]
    fn load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("station.yaml");
        let err = Profile::load(&missing).unwrap_err();
        assert!(format!("{err:#}").contains("station.yaml"));

        fs::write(&missing, "sigdir: out/sig\n").unwrap();
        let profile = Profile::load_optional(Some(&missing)).unwrap();
        assert_eq!(profile.sigdir, Some(PathBuf::from("out/sig")));
        assert_eq!(Profile::load_optional(None).unwrap(), Profile::default());
    }
}
