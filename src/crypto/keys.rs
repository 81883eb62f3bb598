//! Key derivation helpers using HKDF-SHA256.
//!
//! From a single Argon2id master key we derive independent sub-keys:
//! - a **data key** that seals the vault payload,
//! - an **HMAC key** for envelope integrity checks,
//! - a **login verifier** stored in account records in place of the password.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::errors::{PassKeeperError, Result};

/// Length of derived sub-keys (256 bits).
const KEY_LEN: usize = 32;

/// Derive the payload encryption key from the master key.
pub fn derive_data_key(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, b"passkeeper-data-key")
}

/// Derive an HMAC key from the master key.
pub fn derive_hmac_key(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, b"passkeeper-hmac-key")
}

/// Derive the value an account record stores to check logins against.
pub fn derive_login_verifier(master_key: &[u8]) -> Result<[u8; KEY_LEN]> {
    hkdf_derive(master_key, b"passkeeper-login-verifier")
}

// The master key already came out of Argon2id, so it is used directly as
// the PRK and the extract step is skipped.
fn hkdf_derive(ikm: &[u8], info: &[u8]) -> Result<[u8; KEY_LEN]> {
    let hk = Hkdf::<Sha256>::new(None, ikm);

    let mut okm = [0u8; KEY_LEN];
    hk.expand(info, &mut okm)
        .map_err(|e| PassKeeperError::KeyDerivationFailed(format!("HKDF expand failed: {e}")))?;

    Ok(okm)
}

/// A 32-byte master key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    pub fn derive_data_key(&self) -> Result<[u8; KEY_LEN]> {
        derive_data_key(&self.bytes)
    }

    pub fn derive_hmac_key(&self) -> Result<[u8; KEY_LEN]> {
        derive_hmac_key(&self.bytes)
    }

    pub fn derive_login_verifier(&self) -> Result<[u8; KEY_LEN]> {
        derive_login_verifier(&self.bytes)
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey").field("bytes", &"<REDACTED>").finish()
    }
}
