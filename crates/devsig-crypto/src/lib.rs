//! # devsig-crypto — License Signing
//!
//! Binds a device identity to licensed usage parameters with an ECDSA
//! signature.
//!
//! - **Pre-signing record** ([`presign`]) — the frozen 20-byte message
//!   covering license type, EUI-64, issue time and [`BeatstackParams`].
//! - **Signer** ([`signer`]) — the [`LicenseSigner`] trait and the in-memory
//!   [`P256Signer`], loaded from SEC1 or PKCS#8 PEM.
//! - **License** ([`license`]) — [`SignedLicense`] assembly, splitting and
//!   verification against an SPKI public key.
//!
//! ## Crate Policy
//!
//! - The signing primitive comes from `p256`; this crate only builds the
//!   message and the artifact around it.
//! - Key material never appears in `Debug` output or logs.

pub mod error;
pub mod license;
pub mod presign;
pub mod signer;

pub use error::CryptoError;
pub use license::{LicenseVerifier, LicenseView, SignedLicense, LICENSE_LEN};
pub use presign::{build_presign, BeatstackParams, PreSigningRecord, LICENSE_TYPE, PRESIGN_LEN};
pub use signer::{LicenseSigner, P256Signer, RawSignature, SIGNATURE_LEN};
