//! AES-256-GCM sealing of vault payloads.
//!
//! A sealed buffer is `nonce(12) || ciphertext || tag(16)`. The caller's
//! associated data (the vault label) is authenticated but not stored, so a
//! payload only opens under the label it was sealed for.

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};

use crate::errors::{PassKeeperError, Result};

pub const NONCE_LEN: usize = 12;

/// Bytes a seal adds on top of the plaintext.
pub const SEAL_OVERHEAD: usize = NONCE_LEN + 16;

/// Seal `plaintext` under `key`, binding `aad` into the tag.
pub fn seal(key: &[u8; 32], aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.into());
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

    let body = cipher
        .encrypt(&nonce, Payload { msg: plaintext, aad })
        .map_err(|e| PassKeeperError::EncryptionFailed(e.to_string()))?;

    let mut sealed = Vec::with_capacity(NONCE_LEN + body.len());
    sealed.extend_from_slice(&nonce);
    sealed.extend(body);
    Ok(sealed)
}

/// Open a buffer produced by [`seal`] with the same key and `aad`.
///
/// Every failure (short input, wrong key, wrong label, tampering) is the
/// same `DecryptionFailed`.
pub fn open(key: &[u8; 32], aad: &[u8], sealed: &[u8]) -> Result<Vec<u8>> {
    if sealed.len() < SEAL_OVERHEAD {
        return Err(PassKeeperError::DecryptionFailed);
    }
    let (nonce, body) = sealed.split_at(NONCE_LEN);

    Aes256Gcm::new(key.into())
        .decrypt(Nonce::from_slice(nonce), Payload { msg: body, aad })
        .map_err(|_| PassKeeperError::DecryptionFailed)
}
