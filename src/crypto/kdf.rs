//! Argon2id password hashing into a 32-byte master key.
//!
//! The parameters a vault was created with travel in its header, so later
//! config changes only affect vaults and accounts created afterwards.

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::errors::{PassKeeperError, Result};

pub const SALT_LEN: usize = 32;

const KEY_LEN: usize = 32;

/// Floor for `memory_kib`; anything cheaper is refused.
pub const MIN_MEMORY_KIB: u32 = 8_192;

/// Argon2id cost settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Params {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for Argon2Params {
    /// 64 MiB, 3 passes, 4 lanes.
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Refuse settings below the floor or outside what argon2 accepts.
    pub fn validate(&self) -> Result<()> {
        self.to_argon2().map(|_| ())
    }

    fn to_argon2(self) -> Result<Params> {
        let reject = |why: String| Err(PassKeeperError::KeyDerivationFailed(why));
        if self.memory_kib < MIN_MEMORY_KIB {
            return reject(format!(
                "argon2 memory_kib {} is below the minimum of {MIN_MEMORY_KIB}",
                self.memory_kib
            ));
        }
        if self.iterations == 0 || self.parallelism == 0 {
            return reject("argon2 iterations and parallelism must be at least 1".into());
        }
        Params::new(
            self.memory_kib,
            self.iterations,
            self.parallelism,
            Some(KEY_LEN),
        )
        .map_err(|e| PassKeeperError::KeyDerivationFailed(format!("argon2 params: {e}")))
    }
}

/// Hash `password` with `salt` under `params`.
pub fn derive_master_key(
    password: &[u8],
    salt: &[u8],
    params: &Argon2Params,
) -> Result<[u8; KEY_LEN]> {
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params.to_argon2()?);

    let mut key = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut key)
        .map_err(|e| PassKeeperError::KeyDerivationFailed(format!("argon2id: {e}")))?;
    Ok(key)
}

/// A fresh random salt from the thread-local CSPRNG.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
