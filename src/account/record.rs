//! Account records and the per-account service records they own.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{PassKeeperError, Result};
use crate::vault::format::{base64_decode, base64_encode};

/// Longest accepted username.
pub const MAX_USERNAME_LEN: usize = 64;

/// What is persisted in `accounts/<username>/account.json`.
///
/// The password itself is never stored, only a verifier derived from the
/// Argon2id master key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountRecord {
    pub username: String,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub salt: Vec<u8>,

    pub argon2_params: Argon2Params,

    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub verifier: Vec<u8>,

    pub created_at: DateTime<Utc>,
}

/// One (service, account, password) triple stored for a logged-in user.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct ServiceRecord {
    pub service: String,
    pub account: String,
    pub password: String,
    #[zeroize(skip)]
    pub updated_at: DateTime<Utc>,
}

impl ServiceRecord {
    pub fn new(service: &str, account: &str, password: &str) -> Self {
        Self {
            service: service.to_string(),
            account: account.to_string(),
            password: password.to_string(),
            updated_at: Utc::now(),
        }
    }

    pub fn is(&self, service: &str, account: &str) -> bool {
        self.service == service && self.account == account
    }
}

impl fmt::Debug for ServiceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRecord")
            .field("service", &self.service)
            .field("account", &self.account)
            .field("password", &"<REDACTED>")
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Validate that a username is safe to use as a directory name.
///
/// Allowed: ASCII letters, digits, underscores, hyphens, periods.
/// Must be non-empty, at most 64 characters, and not only dots.
pub fn validate_username(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PassKeeperError::InvalidField {
            field: "username",
            reason: "cannot be empty".into(),
        });
    }
    if name.len() > MAX_USERNAME_LEN {
        return Err(PassKeeperError::InvalidField {
            field: "username",
            reason: format!("cannot exceed {MAX_USERNAME_LEN} characters"),
        });
    }
    if name.bytes().all(|b| b == b'.') {
        return Err(PassKeeperError::InvalidField {
            field: "username",
            reason: "cannot consist only of periods".into(),
        });
    }
    if !name
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-' || b == b'.')
    {
        return Err(PassKeeperError::InvalidField {
            field: "username",
            reason: format!(
                "'{name}' may only contain ASCII letters, digits, underscores, hyphens, and periods"
            ),
        });
    }
    Ok(())
}
