//! Binary vault envelope and HMAC integrity verification.
//!
//! A `.vault` file has this layout:
//!
//! ```text
//! [PKVT: 4 bytes][version: 1 byte][header_len: 4 bytes LE][header JSON][sealed payload][HMAC-SHA256: 32 bytes]
//! ```
//!
//! - **Magic** (`PKVT`): identifies the file as a PassKeeper vault.
//! - **Header JSON**: serialized `VaultHeader` (salt, KDF params, label).
//! - **Sealed payload**: AES-256-GCM `nonce || ciphertext` of the payload JSON.
//! - **HMAC-SHA256**: 32-byte tag over header + sealed payload bytes.
//!
//! The same envelope holds the credential vault and each account's
//! service records; only the payload type differs.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use zeroize::Zeroize;

use crate::crypto::kdf::Argon2Params;
use crate::crypto::keys::MasterKey;
use crate::crypto::encryption::{open, seal};
use crate::errors::{PassKeeperError, Result};

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"PKVT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the HMAC tag appended to the file (SHA-256 = 32 bytes).
const HMAC_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (header_len).
const PREFIX_LEN: usize = 9;

/// Metadata stored at the beginning of a vault file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultHeader {
    pub version: u8,

    /// The salt used for Argon2id key derivation (base64 in JSON).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    pub created_at: DateTime<Utc>,

    /// What the vault holds: `credentials`, or the owning account name.
    pub label: String,

    /// Argon2 params used at creation so reopening derives the same key.
    pub argon2_params: Argon2Params,
}

impl VaultHeader {
    pub fn new(salt: Vec<u8>, label: &str, argon2_params: Argon2Params) -> Self {
        Self {
            version: CURRENT_VERSION,
            salt,
            created_at: Utc::now(),
            label: label.to_string(),
            argon2_params,
        }
    }
}

/// Raw data read from a vault file on disk.
///
/// Keeps the original bytes so the HMAC is verified over exactly what
/// was written, before anything is decrypted.
pub struct RawVault {
    pub header: VaultHeader,
    pub header_bytes: Vec<u8>,
    pub sealed_payload: Vec<u8>,
    pub stored_hmac: Vec<u8>,
}

impl RawVault {
    /// Verify the integrity tag with `key`, then decrypt and deserialize.
    ///
    /// A tag mismatch means the key is wrong or the file was tampered
    /// with; both surface as `DecryptionFailed`.
    pub fn open_payload<T: DeserializeOwned>(&self, key: &MasterKey) -> Result<T> {
        let mut hmac_key = key.derive_hmac_key()?;
        let verified = verify_hmac(
            &hmac_key,
            &self.header_bytes,
            &self.sealed_payload,
            &self.stored_hmac,
        );
        hmac_key.zeroize();
        verified?;

        let mut data_key = key.derive_data_key()?;
        let plaintext = open(&data_key, self.header.label.as_bytes(), &self.sealed_payload);
        data_key.zeroize();
        let mut plaintext = plaintext?;

        let parsed = serde_json::from_slice(&plaintext)
            .map_err(|e| PassKeeperError::InvalidVaultFormat(format!("payload JSON: {e}")));
        plaintext.zeroize();
        parsed
    }
}

/// Seal `payload` and write the envelope to disk **atomically**.
///
/// The bytes go to a temp file in the same directory which is then
/// renamed over the target, so readers never see a half-written vault.
pub fn write_vault<T: Serialize>(
    path: &Path,
    header: &VaultHeader,
    payload: &T,
    key: &MasterKey,
) -> Result<()> {
    let header_bytes = serde_json::to_vec(header)
        .map_err(|e| PassKeeperError::SerializationError(format!("header: {e}")))?;
    let mut plaintext = serde_json::to_vec(payload)
        .map_err(|e| PassKeeperError::SerializationError(format!("payload: {e}")))?;

    let mut data_key = key.derive_data_key()?;
    let sealed = seal(&data_key, header.label.as_bytes(), &plaintext);
    data_key.zeroize();
    plaintext.zeroize();
    let sealed = sealed?;

    let mut hmac_key = key.derive_hmac_key()?;
    let hmac_tag = compute_hmac(&hmac_key, &header_bytes, &sealed);
    hmac_key.zeroize();
    let hmac_tag = hmac_tag?;

    let header_len = u32::try_from(header_bytes.len()).map_err(|_| {
        PassKeeperError::SerializationError(format!(
            "header length {} exceeds u32::MAX",
            header_bytes.len()
        ))
    })?;
    let total = PREFIX_LEN + header_bytes.len() + sealed.len() + HMAC_LEN;
    let mut buf = Vec::with_capacity(total);

    buf.extend_from_slice(MAGIC);
    buf.push(CURRENT_VERSION);
    buf.extend_from_slice(&header_len.to_le_bytes());
    buf.extend_from_slice(&header_bytes);
    buf.extend_from_slice(&sealed);
    buf.extend_from_slice(&hmac_tag);

    let parent = path.parent().unwrap_or(Path::new("."));
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    fs::write(&tmp_path, &buf)
        .and_then(|()| fs::rename(&tmp_path, path))
        .map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            PassKeeperError::WriteFailed(format!("{}: {e}", path.display()))
        })
}

/// Read a vault file from disk and split it into its parts.
pub fn read_vault(path: &Path) -> Result<RawVault> {
    if !path.exists() {
        return Err(PassKeeperError::StoreMissing(path.display().to_string()));
    }

    let data = fs::read(path)?;

    let min_size = PREFIX_LEN + HMAC_LEN;
    if data.len() < min_size {
        return Err(PassKeeperError::InvalidVaultFormat(
            "file too small to be a valid vault".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(PassKeeperError::InvalidVaultFormat(
            "missing PKVT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(PassKeeperError::InvalidVaultFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let header_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| PassKeeperError::InvalidVaultFormat("bad header length".into()))?,
    );
    let header_len = usize::try_from(header_len_u32).map_err(|_| {
        PassKeeperError::InvalidVaultFormat(format!(
            "header length {header_len_u32} exceeds platform address space"
        ))
    })?;

    let header_end = PREFIX_LEN + header_len;
    if header_end + HMAC_LEN > data.len() {
        return Err(PassKeeperError::InvalidVaultFormat(
            "header length exceeds file size".into(),
        ));
    }

    let header_bytes = data[PREFIX_LEN..header_end].to_vec();
    let payload_end = data.len() - HMAC_LEN;
    let sealed_payload = data[header_end..payload_end].to_vec();
    let stored_hmac = data[payload_end..].to_vec();

    let header: VaultHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| PassKeeperError::InvalidVaultFormat(format!("header JSON: {e}")))?;

    Ok(RawVault {
        header,
        header_bytes,
        sealed_payload,
        stored_hmac,
    })
}

/// Compute HMAC-SHA256 over header + payload bytes.
pub fn compute_hmac(hmac_key: &[u8], header_bytes: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| PassKeeperError::KeyDerivationFailed(format!("invalid HMAC key: {e}")))?;

    mac.update(header_bytes);
    mac.update(payload);

    Ok(mac.finalize().into_bytes().to_vec())
}

/// Verify the HMAC in constant time (`Mac::verify_slice`).
pub fn verify_hmac(
    hmac_key: &[u8],
    header_bytes: &[u8],
    payload: &[u8],
    expected_hmac: &[u8],
) -> Result<()> {
    let mut mac = Hmac::<Sha256>::new_from_slice(hmac_key)
        .map_err(|e| PassKeeperError::KeyDerivationFailed(format!("invalid HMAC key: {e}")))?;

    mac.update(header_bytes);
    mac.update(payload);

    mac.verify_slice(expected_hmac)
        .map_err(|_| PassKeeperError::DecryptionFailed)
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&BASE64.encode(data))
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn key(byte: u8) -> MasterKey {
        MasterKey::new([byte; 32])
    }

    #[test]
    fn sealed_payload_reopens_with_same_key() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.vault");
        let header = VaultHeader::new(vec![1; 32], "credentials", Argon2Params::default());

        write_vault(&path, &header, &vec!["a".to_string(), "b".to_string()], &key(7)).unwrap();

        let raw = read_vault(&path).unwrap();
        assert_eq!(raw.header.label, "credentials");
        let payload: Vec<String> = raw.open_payload(&key(7)).unwrap();
        assert_eq!(payload, vec!["a", "b"]);
    }

    #[test]
    fn wrong_key_is_rejected_before_decryption() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.vault");
        let header = VaultHeader::new(vec![1; 32], "credentials", Argon2Params::default());
        write_vault(&path, &header, &Vec::<String>::new(), &key(7)).unwrap();

        let raw = read_vault(&path).unwrap();
        let opened: Result<Vec<String>> = raw.open_payload(&key(8));
        assert!(matches!(opened, Err(PassKeeperError::DecryptionFailed)));
    }

    #[test]
    fn tampered_payload_is_detected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("t.vault");
        let header = VaultHeader::new(vec![1; 32], "credentials", Argon2Params::default());
        write_vault(&path, &header, &vec!["x".to_string()], &key(3)).unwrap();

        let mut bytes = fs::read(&path).unwrap();
        let idx = bytes.len() - HMAC_LEN - 1;
        bytes[idx] ^= 0xFF;
        fs::write(&path, bytes).unwrap();

        let raw = read_vault(&path).unwrap();
        let opened: Result<Vec<String>> = raw.open_payload(&key(3));
        assert!(opened.is_err());
    }

    #[test]
    fn missing_file_and_bad_magic() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("absent.vault");
        assert!(matches!(
            read_vault(&path),
            Err(PassKeeperError::StoreMissing(_))
        ));

        fs::write(&path, vec![0u8; 64]).unwrap();
        assert!(matches!(
            read_vault(&path),
            Err(PassKeeperError::InvalidVaultFormat(_))
        ));
    }
}
