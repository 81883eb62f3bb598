//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - `CredentialEntry` and `EntryDraft` types (`entry`)
//! - Binary vault envelope with HMAC integrity (`format`)
//! - High-level `VaultStore` for creating, opening, and editing the vault (`store`)

pub mod entry;
pub mod format;
pub mod store;

pub use entry::{CredentialEntry, EntryDraft};
pub use format::VaultHeader;
pub use store::VaultStore;
