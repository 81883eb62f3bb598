//! Primitives behind every `.vault` file: Argon2id turns a password into a
//! master key, HKDF splits it into sub-keys, AES-256-GCM seals the payload.

pub mod encryption;
pub mod kdf;
pub mod keys;

pub use encryption::{open, seal};
pub use kdf::{derive_master_key, generate_salt, Argon2Params};
pub use keys::{derive_data_key, derive_hmac_key, derive_login_verifier, MasterKey};
