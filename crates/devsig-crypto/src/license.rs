//! # Signed License
//!
//! A license is the pre-signing record followed by the raw fixed-width
//! signature, 84 bytes in total with no length prefix and no CRC:
//!
//! ```text
//! presign[20] | r[32] | s[32]
//! ```

use std::fs;
use std::path::Path;

use devsig_core::{Eui64, Timestamp};
use p256::ecdsa::signature::hazmat::PrehashVerifier;
use p256::ecdsa::VerifyingKey;
use p256::pkcs8::DecodePublicKey;
use serde::Serialize;

use crate::error::CryptoError;
use crate::presign::{BeatstackParams, PreSigningRecord, PRESIGN_LEN};
use crate::signer::{LicenseSigner, RawSignature, SIGNATURE_LEN};

/// Encoded length of a [`SignedLicense`].
pub const LICENSE_LEN: usize = PRESIGN_LEN + SIGNATURE_LEN;

/// Pre-signing record plus its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedLicense {
    presign: PreSigningRecord,
    signature: RawSignature,
}

impl SignedLicense {
    /// Build and sign a license for `eui`.
    pub fn issue(
        signer: &dyn LicenseSigner,
        eui: Eui64,
        created: Timestamp,
        params: BeatstackParams,
    ) -> Result<Self, CryptoError> {
        let presign = PreSigningRecord::new(eui, created, params);
        let signature = signer.sign_presign(&presign.to_bytes())?;
        tracing::debug!(eui = %eui, signer = signer.signer_name(), "signed license");
        Ok(Self { presign, signature })
    }

    /// Pair an existing record and signature.
    pub fn from_parts(presign: PreSigningRecord, signature: RawSignature) -> Self {
        Self { presign, signature }
    }

    /// The signed record.
    pub fn presign(&self) -> &PreSigningRecord {
        &self.presign
    }

    /// The signature.
    pub fn signature(&self) -> &RawSignature {
        &self.signature
    }

    /// Licensed device.
    pub fn eui(&self) -> Eui64 {
        self.presign.eui
    }

    /// The 84 license bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(LICENSE_LEN);
        out.extend_from_slice(&self.presign.to_bytes());
        out.extend_from_slice(self.signature.as_bytes());
        out
    }

    /// Split license bytes into record and signature.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidLength`] unless exactly 84 bytes are given, and
    /// any error from [`PreSigningRecord::from_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != LICENSE_LEN {
            return Err(CryptoError::InvalidLength {
                what: "license",
                expected: LICENSE_LEN,
                actual: bytes.len(),
            });
        }
        let (presign, signature) = bytes.split_at(PRESIGN_LEN);
        let mut raw = [0u8; SIGNATURE_LEN];
        raw.copy_from_slice(signature);
        Ok(Self {
            presign: PreSigningRecord::from_bytes(presign)?,
            signature: RawSignature::from_bytes(raw),
        })
    }

    /// Check the signature under `verifier`.
    pub fn verify(&self, verifier: &LicenseVerifier) -> Result<(), CryptoError> {
        verifier.verify(self)
    }
}

/// Public key that licenses are checked against.
#[derive(Debug, Clone)]
pub struct LicenseVerifier {
    key: VerifyingKey,
}

impl LicenseVerifier {
    /// Wrap a verifying key.
    pub fn new(key: VerifyingKey) -> Self {
        Self { key }
    }

    /// Verifier for the key held by `signer`.
    pub fn for_signer(signer: &dyn LicenseSigner) -> Self {
        Self::new(signer.verifying_key())
    }

    /// Decode an SPKI `PUBLIC KEY` PEM.
    pub fn from_public_key_pem(pem: &str) -> Result<Self, CryptoError> {
        VerifyingKey::from_public_key_pem(pem)
            .map(Self::new)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }

    /// Read and decode an SPKI PEM file.
    pub fn from_pem_file(path: &Path) -> Result<Self, CryptoError> {
        let pem = fs::read_to_string(path).map_err(CryptoError::io(path))?;
        Self::from_public_key_pem(&pem)
    }

    /// Check `license`.
    ///
    /// # Errors
    ///
    /// [`CryptoError::VerificationFailed`] if the signature is malformed or
    /// does not match.
    pub fn verify(&self, license: &SignedLicense) -> Result<(), CryptoError> {
        let failed = || CryptoError::VerificationFailed { eui: license.eui() };
        let signature = license.signature.to_signature().map_err(|_| failed())?;
        self.key
            .verify_prehash(&license.presign.to_bytes(), &signature)
            .map_err(|_| failed())
    }
}

/// A license flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseView {
    /// Licensed device, 16 hex digits.
    pub eui64: String,
    /// Issue time, Unix seconds.
    pub created: i64,
    /// Issue time, RFC 3339 UTC.
    pub created_utc: String,
    /// Licensed sizing.
    pub params: BeatstackParams,
    /// Signature `r`, hex.
    pub r: String,
    /// Signature `s`, hex.
    pub s: String,
}

impl From<&SignedLicense> for LicenseView {
    fn from(license: &SignedLicense) -> Self {
        let hex = |bytes: &[u8]| bytes.iter().map(|b| format!("{b:02X}")).collect::<String>();
        Self {
            eui64: license.eui().to_hex(),
            created: license.presign.created.unix(),
            created_utc: license.presign.created.to_rfc3339(),
            params: license.presign.params,
            r: hex(license.signature.r()),
            s: hex(license.signature.s()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signer::P256Signer;

    fn params() -> BeatstackParams {
        BeatstackParams {
            nodes_in_cluster: 8,
            partnerships: 2,
            clusters: 4,
        }
    }

    fn issue(signer: &P256Signer) -> SignedLicense {
        SignedLicense::issue(
            signer,
            Eui64::new(0x70B3_D5A4_E000_0001),
            Timestamp::from_unix(1_700_000_000).unwrap(),
            params(),
        )
        .unwrap()
    }

    #[test]
    fn license_is_84_bytes_with_presign_prefix() {
        let signer = P256Signer::generate();
        let license = issue(&signer);
        let bytes = license.to_bytes();
        assert_eq!(bytes.len(), 84);
        assert_eq!(&bytes[..20], &license.presign().to_bytes());
        assert_eq!(&bytes[20..52], license.signature().r());
        assert_eq!(&bytes[52..], license.signature().s());
    }

    #[test]
    fn issued_license_verifies() {
        let signer = P256Signer::generate();
        let license = issue(&signer);
        let decoded = SignedLicense::from_bytes(&license.to_bytes()).unwrap();
        assert_eq!(decoded, license);
        decoded.verify(&LicenseVerifier::for_signer(&signer)).unwrap();
    }

    #[test]
    fn other_key_does_not_verify() {
        let license = issue(&P256Signer::generate());
        let other = LicenseVerifier::for_signer(&P256Signer::generate());
        assert!(matches!(
            license.verify(&other),
            Err(CryptoError::VerificationFailed { .. })
        ));
    }

    #[test]
    fn tampered_params_do_not_verify() {
        let signer = P256Signer::generate();
        let mut bytes = issue(&signer).to_bytes();
        bytes[17] = bytes[17].wrapping_add(1);
        let tampered = SignedLicense::from_bytes(&bytes).unwrap();
        assert!(tampered.verify(&LicenseVerifier::for_signer(&signer)).is_err());
    }

    #[test]
    fn zero_signature_does_not_verify() {
        let signer = P256Signer::generate();
        let license =
            SignedLicense::from_parts(*issue(&signer).presign(), RawSignature::from_bytes([0; 64]));
        assert!(matches!(
            license.verify(&LicenseVerifier::for_signer(&signer)),
            Err(CryptoError::VerificationFailed { .. })
        ));
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(matches!(
            SignedLicense::from_bytes(&[4u8; 83]),
            Err(CryptoError::InvalidLength { expected: 84, actual: 83, .. })
        ));
    }

    #[test]
    fn public_key_pem_roundtrip_verifies() {
        let signer = P256Signer::generate();
        let verifier =
            LicenseVerifier::from_public_key_pem(&signer.public_key_pem().unwrap()).unwrap();
        issue(&signer).verify(&verifier).unwrap();
    }

    #[test]
    fn view_renders_hex() {
        let license = issue(&P256Signer::generate());
        let json = serde_json::to_value(LicenseView::from(&license)).unwrap();
        assert_eq!(json["eui64"], "70B3D5A4E0000001");
        assert_eq!(json["created"], 1_700_000_000);
        assert_eq!(json["params"]["nodes_in_cluster"], 8);
        assert_eq!(json["r"].as_str().unwrap().len(), 64);
    }
}
