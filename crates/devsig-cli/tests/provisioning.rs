//! A provisioning station run: generate a ledger, issue user signatures,
//! license the issued devices and check the results on disk.

use std::fs;
use std::path::{Path, PathBuf};

use devsig_cli::config::Profile;
use devsig_cli::euigen::{run_euigen, EuigenArgs};
use devsig_cli::inspect::{run_inspect, InspectArgs};
use devsig_cli::keygen::{run_keygen, KeygenArgs};
use devsig_cli::license::{run_license, LicenseArgs};
use devsig_cli::usersig::{run_usersig, UsersigArgs};
use devsig_cli::verify::{run_verify_license, VerifyLicenseArgs};
use devsig_core::{ComponentVersion, Eui64};
use devsig_crypto::SignedLicense;
use devsig_pool::{Entry, IdentifierPool, LedgerLock};
use devsig_record::{ProvisioningBlob, SignatureStore};

const BEATSTACK: &str = "BEATS_IN_CYCLE = 4\nNODES_IN_BEAT = 16\nMAX_PARTNER_COUNT_FOR_NODE = 3\n";

struct Station {
    _dir: tempfile::TempDir,
    root: PathBuf,
    profile: Profile,
}

impl Station {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::write(root.join("beatstack.conf"), BEATSTACK).unwrap();
        let profile = Profile::from_yaml_str(&format!(
            "ledger: {root}/eui.txt\nlist: {root}/list.txt\n\
             sigdir: {root}/sigdata\nsigout: {root}/sigdata.bin\n\
             licdir: {root}/licensedata\nlicout: {root}/license.bin\nkeyfile: {root}/signing.pem\n\
             pubkey: {root}/signing.pem.pub\nbstkconf: {root}/beatstack.conf\n",
            root = root.display()
        ))
        .unwrap();
        Self { _dir: dir, root, profile }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn euigen(&self, first: u64, last: u64) {
        let args = EuigenArgs {
            first: Eui64::new(first),
            last: Eui64::new(last),
            ledger: None,
            list: None,
        };
        assert_eq!(run_euigen(&args, &self.profile).unwrap(), 0);
    }

    fn usersig(&self, board: &str) -> anyhow::Result<u8> {
        let args = UsersigArgs {
            board_name: board.to_string(),
            board_version: ComponentVersion::new(1, 2, 0),
            board_uuid: None,
            manufacturer: None,
            serial: None,
            position: 0,
            timestamp: Some(1_704_067_200),
            ledger: None,
            sigdir: None,
            out: None,
        };
        run_usersig(&args, &self.profile)
    }

    fn keygen(&self) {
        let args = KeygenArgs {
            key_out: self.path("signing.pem"),
            pub_out: None,
        };
        assert_eq!(run_keygen(&args).unwrap(), 0);
    }

    fn license(&self, eui: Option<u64>) -> anyhow::Result<u8> {
        let args = LicenseArgs {
            eui: eui.map(Eui64::new),
            euifile: None,
            keyfile: None,
            bstkconf: None,
            timestamp: Some(1_704_067_300),
            licdir: None,
            out: None,
        };
        run_license(&args, &self.profile)
    }
}

fn annotation_of(ledger: &Path, eui: u64) -> Option<String> {
    let ledger = IdentifierPool::new(ledger).load().unwrap();
    ledger.lines().iter().find_map(|line| match line.entry() {
        Entry::Annotated { eui: e, annotation } if e.value() == eui => Some(annotation.clone()),
        _ => None,
    })
}

#[test]
fn station_issues_signatures_in_ledger_order() {
    let station = Station::new();
    station.euigen(0x70B3_D5A4_E000_0000, 0x70B3_D5A4_E000_0002);

    let ledger = station.path("eui.txt");
    let remaining = || IdentifierPool::new(&ledger).load().unwrap().available_count();
    assert_eq!(remaining(), 2);
    assert_eq!(station.usersig("smenete").unwrap(), 0);
    assert_eq!(remaining(), 1);
    assert_eq!(station.usersig("smenete").unwrap(), 0);
    assert_eq!(remaining(), 0);

    assert_eq!(
        annotation_of(&ledger, 0x70B3_D5A4_E000_0001).as_deref(),
        Some("smenete,1.2.0,1704067200")
    );
    assert!(annotation_of(&ledger, 0x70B3_D5A4_E000_0002).is_some());
    assert_eq!(annotation_of(&ledger, 0x70B3_D5A4_E000_0000).as_deref(), Some("RESERVED"));

    let store = SignatureStore::new(station.path("sigdata"));
    let stored = store.load(Eui64::new(0x70B3_D5A4_E000_0002)).unwrap();
    let blob = ProvisioningBlob::from_bytes(&stored).unwrap();
    assert_eq!(blob.eui(), Eui64::new(0x70B3_D5A4_E000_0002));
    assert_eq!(blob.board().unwrap().name().as_text(), "smenete");

    // The working copy is the latest signature.
    assert_eq!(fs::read(station.path("sigdata.bin")).unwrap(), stored);

    // The lower boundary is reserved and everything else is issued.
    assert!(station.usersig("smenete").is_err());
}

#[test]
fn usersig_rejects_bad_board_name_without_allocating() {
    let station = Station::new();
    station.euigen(0x70B3_D5A4_E000_0001, 0x70B3_D5A4_E000_0002);
    let before = fs::read(station.path("eui.txt")).unwrap();

    let err = station.usersig("a-board-name-too-long").unwrap_err();
    assert!(format!("{err:#}").contains("name"));
    assert!(station.usersig("").is_err());

    assert_eq!(fs::read(station.path("eui.txt")).unwrap(), before);
    assert!(!station.path("sigdata").exists());
}

#[test]
fn usersig_fails_fast_while_ledger_is_leased() {
    let station = Station::new();
    station.euigen(0x70B3_D5A4_E000_0001, 0x70B3_D5A4_E000_0002);
    let ledger = station.path("eui.txt");

    let lease = LedgerLock::acquire(&ledger).unwrap();
    let err = station.usersig("smenete").unwrap_err();
    assert!(format!("{err:#}").contains("lock"));
    drop(lease);

    assert_eq!(station.usersig("smenete").unwrap(), 0);
}

#[test]
fn usersig_refuses_existing_signature_file() {
    let station = Station::new();
    station.euigen(0x70B3_D5A4_E000_0001, 0x70B3_D5A4_E000_0002);
    let sigdir = station.path("sigdata");
    fs::create_dir_all(&sigdir).unwrap();
    fs::write(sigdir.join(Eui64::new(0x70B3_D5A4_E000_0001).artifact_filename()), b"old").unwrap();

    let err = station.usersig("smenete").unwrap_err();
    assert!(format!("{err:#}").contains("already exists"));
    assert!(annotation_of(&station.path("eui.txt"), 0x70B3_D5A4_E000_0001).is_none());
}

#[test]
fn licenses_cover_the_ledger_and_verify() {
    let station = Station::new();
    station.keygen();
    station.euigen(0x70B3_D5A4_E000_0000, 0x70B3_D5A4_E000_0002);
    assert_eq!(station.license(None).unwrap(), 0);

    let licdir = station.path("licensedata");
    for eui in [0x70B3_D5A4_E000_0001u64, 0x70B3_D5A4_E000_0002] {
        let path = licdir.join(Eui64::new(eui).artifact_filename());
        let license = SignedLicense::from_bytes(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(license.eui(), Eui64::new(eui));
        assert_eq!(license.presign().params.nodes_in_cluster, 16);

        let verify = VerifyLicenseArgs {
            license: path,
            pubkey: None,
            json: true,
        };
        assert_eq!(run_verify_license(&verify, &station.profile).unwrap(), 0);
    }
    assert!(!licdir.join(Eui64::new(0x70B3_D5A4_E000_0000).artifact_filename()).exists());

    // Rerunning over the same ledger stops at the first existing license.
    let err = station.license(None).unwrap_err();
    assert!(format!("{err:#}").contains("already exists"));

    // An explicit identifier replaces its license.
    assert_eq!(station.license(Some(0x70B3_D5A4_E000_0001)).unwrap(), 0);
    let latest = fs::read(station.path("license.bin")).unwrap();
    assert_eq!(
        SignedLicense::from_bytes(&latest).unwrap().eui(),
        Eui64::new(0x70B3_D5A4_E000_0001)
    );
}

#[test]
fn tampered_license_reports_failure() {
    let station = Station::new();
    station.keygen();
    assert_eq!(station.license(Some(0x70B3_D5A4_E000_0005)).unwrap(), 0);

    let mut bytes = fs::read(station.path("license.bin")).unwrap();
    bytes[19] ^= 0x01;
    let tampered = station.path("tampered.bin");
    fs::write(&tampered, &bytes).unwrap();

    let verify = VerifyLicenseArgs {
        license: tampered,
        pubkey: None,
        json: false,
    };
    assert_eq!(run_verify_license(&verify, &station.profile).unwrap(), 2);
}

#[test]
fn license_requires_key_and_parameters() {
    let args = LicenseArgs {
        eui: Some(Eui64::new(1)),
        euifile: None,
        keyfile: None,
        bstkconf: None,
        timestamp: None,
        licdir: None,
        out: None,
    };
    let err = run_license(&args, &Profile::default()).unwrap_err();
    assert!(err.to_string().contains("--keyfile"));
}

#[test]
fn inspect_accepts_padded_device_dump() {
    let station = Station::new();
    station.euigen(0x70B3_D5A4_E000_0001, 0x70B3_D5A4_E000_0001);
    station.usersig("smenete").unwrap();

    let mut dump = fs::read(station.path("sigdata.bin")).unwrap();
    dump.resize(768, 0xFF);
    let dump_path = station.path("dump.bin");
    fs::write(&dump_path, &dump).unwrap();

    let args = InspectArgs {
        file: dump_path,
        strict: true,
    };
    assert_eq!(run_inspect(&args).unwrap(), 0);

    let garbage = station.path("garbage.bin");
    fs::write(&garbage, [0xFFu8; 64]).unwrap();
    let args = InspectArgs {
        file: garbage,
        strict: false,
    };
    assert!(run_inspect(&args).is_err());
}
