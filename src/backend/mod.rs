//! The backend command surface.
//!
//! Every method is a blocking request/response pair. Callers in the
//! session and client layers never touch keys or files; they only see
//! these commands, their result codes and their errors.

pub mod local;

pub use local::LocalBackend;

use crate::account::ServiceRecord;
use crate::codes::{AccountCode, DataCode};
use crate::errors::Result;
use crate::generator::GeneratorPolicy;
use crate::vault::{CredentialEntry, EntryDraft};

pub trait Backend: Send + Sync {
    // --- provisioning / identity ---

    fn save_account(&self, username: &str, password: &str) -> AccountCode;

    fn validate_login(&self, username: &str, password: &str) -> bool;

    /// Forget the key held for `username` since its last successful login.
    fn logout(&self, username: &str);

    /// The data commands need a live login for `username`. Without one no
    /// key can be derived, so they answer `EncryptionFailed` (save) or
    /// `DecryptionFailed` (get, remove, modify); callers check the login
    /// first and report `NotLoggedIn` instead.
    fn get_data(&self, username: &str) -> std::result::Result<Vec<ServiceRecord>, DataCode>;

    fn save_data(&self, username: &str, service: &str, account: &str, password: &str)
        -> DataCode;

    fn remove_data(&self, username: &str, service: &str, account: &str) -> DataCode;

    fn modify_data(
        &self,
        username: &str,
        service: &str,
        account: &str,
        password: &str,
    ) -> DataCode;

    // --- vault gate ---

    fn is_unlocked(&self) -> bool;

    /// Fails closed: any error leaves the backend locked.
    fn unlock_storage(&self, master_password: &str) -> Result<()>;

    fn lock_storage(&self);

    // --- credential store ---

    /// All entries in insertion order.
    fn get_all_passwords(&self) -> Result<Vec<CredentialEntry>>;

    fn get_password(&self, id: &str) -> Result<Option<CredentialEntry>>;

    /// Returns the id assigned to the new entry.
    fn add_password(&self, draft: &EntryDraft) -> Result<String>;

    fn update_password(&self, id: &str, draft: &EntryDraft) -> Result<()>;

    fn delete_password(&self, id: &str) -> Result<()>;

    fn search_passwords(&self, query: &str) -> Result<Vec<CredentialEntry>>;

    fn generate_password(&self, policy: &GeneratorPolicy) -> Result<String>;
}
