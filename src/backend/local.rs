//! File-backed implementation of the backend command surface.
//!
//! The unlocked credential vault lives behind a mutex, so at most one
//! mutation commits at a time. Account logins are tracked per username
//! and hold the account key until logout or `lock_storage`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::account::{validate_username, AccountRegistry, ServiceRecord};
use crate::codes::{AccountCode, DataCode};
use crate::config::Settings;
use crate::crypto::kdf::Argon2Params;
use crate::crypto::keys::MasterKey;
use crate::errors::{PassKeeperError, Result};
use crate::generator::{self, GeneratorPolicy};
use crate::vault::{CredentialEntry, EntryDraft, VaultStore};

use super::Backend;

pub struct LocalBackend {
    vault_path: PathBuf,
    params: Argon2Params,
    min_password_len: usize,
    accounts: AccountRegistry,
    vault: Mutex<Option<VaultStore>>,
    logins: Mutex<HashMap<String, MasterKey>>,
}

impl LocalBackend {
    pub fn new(
        vault_path: impl Into<PathBuf>,
        accounts_dir: impl Into<PathBuf>,
        params: Argon2Params,
        min_password_len: usize,
    ) -> Self {
        Self {
            vault_path: vault_path.into(),
            params,
            min_password_len,
            accounts: AccountRegistry::new(accounts_dir, params),
            vault: Mutex::new(None),
            logins: Mutex::new(HashMap::new()),
        }
    }

    /// Build a backend rooted at `data_dir` using the paths and KDF
    /// settings from `settings`.
    pub fn from_settings(data_dir: &Path, settings: &Settings) -> Self {
        Self::new(
            settings.vault_path(data_dir),
            settings.accounts_path(data_dir),
            settings.argon2_params(),
            settings.min_master_password_len,
        )
    }

    /// Returns `true` once a credential vault has been initialized on disk.
    pub fn vault_exists(&self) -> bool {
        self.vault_path.exists()
    }

    pub fn vault_path(&self) -> &Path {
        &self.vault_path
    }

    fn vault(&self) -> MutexGuard<'_, Option<VaultStore>> {
        self.vault.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn logins(&self) -> MutexGuard<'_, HashMap<String, MasterKey>> {
        self.logins.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run `f` against the unlocked vault, or fail with `Locked`.
    fn with_vault<T>(&self, f: impl FnOnce(&mut VaultStore) -> Result<T>) -> Result<T> {
        let mut guard = self.vault();
        match guard.as_mut() {
            Some(store) => f(store),
            None => Err(PassKeeperError::Locked),
        }
    }

    /// Run `f` with the key of a logged-in user, or return `missing`.
    fn with_login<T>(&self, username: &str, missing: T, f: impl FnOnce(&MasterKey) -> T) -> T {
        let logins = self.logins();
        match logins.get(username) {
            Some(key) => f(key),
            None => {
                debug!(username, "no live login for data operation");
                missing
            }
        }
    }

    fn open_or_create(&self, master_password: &str) -> Result<VaultStore> {
        if self.vault_path.exists() {
            return VaultStore::open(&self.vault_path, master_password.as_bytes());
        }

        if master_password.chars().count() < self.min_password_len {
            return Err(PassKeeperError::PasswordTooShort(self.min_password_len));
        }
        if let Some(parent) = self.vault_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PassKeeperError::DirectoryCreateFailed(format!("{}: {e}", parent.display()))
            })?;
        }
        info!(path = %self.vault_path.display(), "initializing new credential vault");
        VaultStore::create(&self.vault_path, master_password.as_bytes(), &self.params)
    }
}

impl Backend for LocalBackend {
    fn save_account(&self, username: &str, password: &str) -> AccountCode {
        if validate_username(username).is_err() {
            return AccountCode::DirectoryCreateFailed;
        }
        let code = self.accounts.create(username, password);
        debug!(username, code = code.as_raw(), "save_account");
        code
    }

    fn validate_login(&self, username: &str, password: &str) -> bool {
        match self.accounts.verify(username, password) {
            Some(key) => {
                self.logins().insert(username.to_string(), key);
                true
            }
            None => false,
        }
    }

    fn logout(&self, username: &str) {
        self.logins().remove(username);
    }

    fn get_data(&self, username: &str) -> std::result::Result<Vec<ServiceRecord>, DataCode> {
        self.with_login(username, Err(DataCode::DecryptionFailed), |key| {
            self.accounts.load_services(username, key)
        })
    }

    fn save_data(&self, username: &str, service: &str, account: &str, password: &str) -> DataCode {
        self.with_login(username, DataCode::EncryptionFailed, |key| {
            self.accounts
                .save_service(username, key, service, account, password)
        })
    }

    fn remove_data(&self, username: &str, service: &str, account: &str) -> DataCode {
        self.with_login(username, DataCode::DecryptionFailed, |key| {
            self.accounts.remove_service(username, key, service, account)
        })
    }

    fn modify_data(
        &self,
        username: &str,
        service: &str,
        account: &str,
        password: &str,
    ) -> DataCode {
        self.with_login(username, DataCode::DecryptionFailed, |key| {
            self.accounts
                .modify_service(username, key, service, account, password)
        })
    }

    fn is_unlocked(&self) -> bool {
        self.vault().is_some()
    }

    fn unlock_storage(&self, master_password: &str) -> Result<()> {
        let mut slot = self.vault();
        match self.open_or_create(master_password) {
            Ok(store) => {
                info!(entries = store.len(), "credential storage unlocked");
                *slot = Some(store);
                Ok(())
            }
            Err(e) => {
                *slot = None;
                warn!(error = %e, "unlock rejected");
                Err(e)
            }
        }
    }

    fn lock_storage(&self) {
        *self.vault() = None;
        self.logins().clear();
        info!("credential storage locked");
    }

    fn get_all_passwords(&self) -> Result<Vec<CredentialEntry>> {
        self.with_vault(|store| Ok(store.entries().to_vec()))
    }

    fn get_password(&self, id: &str) -> Result<Option<CredentialEntry>> {
        self.with_vault(|store| Ok(store.get(id).cloned()))
    }

    fn add_password(&self, draft: &EntryDraft) -> Result<String> {
        self.with_vault(|store| {
            let id = store.add(draft)?;
            debug!(%id, "entry added");
            Ok(id)
        })
    }

    fn update_password(&self, id: &str, draft: &EntryDraft) -> Result<()> {
        self.with_vault(|store| {
            store.update(id, draft)?;
            debug!(id, "entry updated");
            Ok(())
        })
    }

    fn delete_password(&self, id: &str) -> Result<()> {
        self.with_vault(|store| {
            store.delete(id)?;
            debug!(id, "entry deleted");
            Ok(())
        })
    }

    fn search_passwords(&self, query: &str) -> Result<Vec<CredentialEntry>> {
        self.with_vault(|store| Ok(store.search(query)))
    }

    fn generate_password(&self, policy: &GeneratorPolicy) -> Result<String> {
        generator::generate(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend(dir: &TempDir) -> LocalBackend {
        LocalBackend::new(
            dir.path().join("passwords.vault"),
            dir.path().join("accounts"),
            Argon2Params {
                memory_kib: 8_192,
                iterations: 1,
                parallelism: 1,
            },
            8,
        )
    }

    #[test]
    fn first_unlock_initializes_and_enforces_length() {
        let tmp = TempDir::new().unwrap();
        let b = backend(&tmp);
        assert!(matches!(
            b.unlock_storage("short"),
            Err(PassKeeperError::PasswordTooShort(8))
        ));
        assert!(!b.vault_exists());

        b.unlock_storage("long-enough-pw").unwrap();
        assert!(b.vault_exists());
        assert!(b.is_unlocked());
    }

    #[test]
    fn wrong_password_fails_closed() {
        let tmp = TempDir::new().unwrap();
        let b = backend(&tmp);
        b.unlock_storage("correct-horse").unwrap();
        b.lock_storage();

        assert!(matches!(
            b.unlock_storage("wrong-horse"),
            Err(PassKeeperError::InvalidCredentials)
        ));
        assert!(!b.is_unlocked());
    }

    #[test]
    fn credential_commands_reject_while_locked() {
        let tmp = TempDir::new().unwrap();
        let b = backend(&tmp);
        assert!(matches!(b.get_all_passwords(), Err(PassKeeperError::Locked)));
        assert!(matches!(
            b.add_password(&EntryDraft::new("Bank", "alice", "p")),
            Err(PassKeeperError::Locked)
        ));
        assert!(matches!(b.delete_password("x"), Err(PassKeeperError::Locked)));
    }

    #[test]
    fn data_commands_need_a_login() {
        let tmp = TempDir::new().unwrap();
        let b = backend(&tmp);
        assert_eq!(b.save_account("alice", "pw1"), AccountCode::Ok);

        assert_eq!(b.save_data("alice", "mail", "a", "p"), DataCode::EncryptionFailed);
        assert_eq!(b.remove_data("alice", "mail", "a"), DataCode::DecryptionFailed);
        assert_eq!(b.modify_data("alice", "mail", "a", "q"), DataCode::DecryptionFailed);
        assert_eq!(b.get_data("alice").unwrap_err(), DataCode::DecryptionFailed);

        assert!(b.validate_login("alice", "pw1"));
        assert_eq!(b.save_data("alice", "mail", "a", "p"), DataCode::Ok);
        assert_eq!(b.get_data("alice").unwrap().len(), 1);

        b.lock_storage();
        assert_eq!(b.get_data("alice").unwrap_err(), DataCode::DecryptionFailed);
    }
}
