//! License issuance from key and parameter files through verification.

use std::fs;

use devsig_core::{Eui64, Timestamp};
use devsig_crypto::{
    build_presign, BeatstackParams, CryptoError, LicenseSigner, LicenseVerifier, P256Signer,
    PreSigningRecord, SignedLicense,
};
use proptest::prelude::*;

const BEATSTACK: &str = "\
# generated by the Beatstack configurator
BEATS_IN_CYCLE = 6
NODES_IN_BEAT = 12
MAX_PARTNER_COUNT_FOR_NODE = 4
";

#[test]
fn license_from_files_verifies_with_public_key_file() {
    let dir = tempfile::tempdir().unwrap();
    let key_path = dir.path().join("signing.pem");
    let pub_path = dir.path().join("signing.pub.pem");
    let conf_path = dir.path().join("beatstack.conf");

    let generated = P256Signer::generate();
    fs::write(&key_path, generated.to_sec1_pem().unwrap()).unwrap();
    fs::write(&pub_path, generated.public_key_pem().unwrap()).unwrap();
    fs::write(&conf_path, BEATSTACK).unwrap();

    let signer = P256Signer::from_pem_file(&key_path).unwrap();
    let params = BeatstackParams::from_config_file(&conf_path).unwrap();
    assert_eq!(
        params,
        BeatstackParams {
            nodes_in_cluster: 12,
            partnerships: 4,
            clusters: 6
        }
    );

    let eui = Eui64::new(0x70B3_D5A4_E000_0042);
    let created = Timestamp::from_unix(1_704_067_200).unwrap();
    let license = SignedLicense::issue(&signer, eui, created, params).unwrap();
    let license_path = dir.path().join(eui.artifact_filename());
    fs::write(&license_path, license.to_bytes()).unwrap();

    let reread = SignedLicense::from_bytes(&fs::read(&license_path).unwrap()).unwrap();
    let verifier = LicenseVerifier::from_pem_file(&pub_path).unwrap();
    reread.verify(&verifier).unwrap();
    assert_eq!(reread.presign(), &PreSigningRecord::new(eui, created, params));
}

#[test]
fn missing_files_name_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let absent = dir.path().join("absent.pem");
    let err = P256Signer::from_pem_file(&absent).unwrap_err();
    assert!(matches!(err, CryptoError::Io { .. }));
    assert!(err.to_string().contains("absent.pem"));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn presign_and_signature_are_reproducible(
        eui in any::<u64>(),
        secs in 0i64..4_102_444_800,
        nodes in any::<u8>(),
        partners in any::<u8>(),
        clusters in any::<u8>(),
    ) {
        let params = BeatstackParams { nodes_in_cluster: nodes, partnerships: partners, clusters };
        let created = Timestamp::from_unix(secs).unwrap();
        let eui = Eui64::new(eui);

        let first = build_presign(eui, created, params);
        prop_assert_eq!(first, build_presign(eui, created, params));
        prop_assert_eq!(
            PreSigningRecord::from_bytes(&first).unwrap(),
            PreSigningRecord::new(eui, created, params)
        );

        let signer = P256Signer::generate();
        prop_assert_eq!(signer.sign_presign(&first).unwrap(), signer.sign_presign(&first).unwrap());
    }
}
