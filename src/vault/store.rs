//! High-level credential vault operations used by the local backend.
//!
//! `VaultStore` wraps the envelope format and the crypto layer so the
//! backend can work with simple calls like `store.add(&draft)`.
//!
//! Every mutation builds the new entry list on the side, writes it to
//! disk, and only then replaces the in-memory list. A failed write leaves
//! the store exactly as it was.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;
use zeroize::Zeroize;

use crate::crypto::kdf::{derive_master_key, generate_salt, Argon2Params};
use crate::crypto::keys::MasterKey;
use crate::errors::{PassKeeperError, Result};

use super::entry::{CredentialEntry, EntryDraft};
use super::format::{self, VaultHeader};

/// Label written into the header of the credential vault.
pub const CREDENTIALS_LABEL: &str = "credentials";

/// The unlocked credential vault.
#[derive(Debug)]
pub struct VaultStore {
    /// Path to the `.vault` file on disk.
    path: PathBuf,

    header: VaultHeader,

    /// Entries in insertion order, which is also the list order.
    entries: Vec<CredentialEntry>,

    /// The derived master key (zeroized on drop).
    master_key: MasterKey,
}

impl VaultStore {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create a brand-new, empty vault file at `path`.
    pub fn create(path: &Path, password: &[u8], argon2_params: &Argon2Params) -> Result<Self> {
        if path.exists() {
            return Err(PassKeeperError::VaultAlreadyExists(path.to_path_buf()));
        }

        let salt = generate_salt();
        let mut master_bytes = derive_master_key(password, &salt, argon2_params)?;
        let master_key = MasterKey::new(master_bytes);
        master_bytes.zeroize();

        let header = VaultHeader::new(salt.to_vec(), CREDENTIALS_LABEL, *argon2_params);
        let store = Self {
            path: path.to_path_buf(),
            header,
            entries: Vec::new(),
            master_key,
        };

        store.persist(&store.entries)?;
        debug!(path = %path.display(), "created credential vault");
        Ok(store)
    }

    /// Open an existing vault, deriving the key from the stored salt and
    /// Argon2 params.
    ///
    /// A password that does not reproduce the integrity tag is reported as
    /// `InvalidCredentials`, with no hint whether the file was tampered with.
    pub fn open(path: &Path, password: &[u8]) -> Result<Self> {
        let raw = format::read_vault(path)?;

        let mut master_bytes =
            derive_master_key(password, &raw.header.salt, &raw.header.argon2_params)?;
        let master_key = MasterKey::new(master_bytes);
        master_bytes.zeroize();

        let entries: Vec<CredentialEntry> = raw
            .open_payload(&master_key)
            .map_err(|e| match e {
                PassKeeperError::DecryptionFailed => PassKeeperError::InvalidCredentials,
                other => other,
            })?;

        debug!(path = %path.display(), entries = entries.len(), "opened credential vault");
        Ok(Self {
            path: path.to_path_buf(),
            header: raw.header,
            entries,
            master_key,
        })
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    pub fn entries(&self) -> &[CredentialEntry] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&CredentialEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Entries whose title, username or url contain `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<CredentialEntry> {
        self.entries
            .iter()
            .filter(|e| e.matches(query))
            .cloned()
            .collect()
    }

    /// Add a new entry and return its freshly assigned id.
    pub fn add(&mut self, draft: &EntryDraft) -> Result<String> {
        draft.validate()?;
        self.check_unique(draft, None)?;

        let id = Uuid::new_v4().to_string();
        let mut next = self.entries.clone();
        next.push(CredentialEntry::from_draft(id.clone(), draft, Utc::now()));

        self.commit(next)?;
        Ok(id)
    }

    /// Replace the editable fields of entry `id`.
    pub fn update(&mut self, id: &str, draft: &EntryDraft) -> Result<()> {
        draft.validate()?;
        let index = self.index_of(id)?;
        self.check_unique(draft, Some(index))?;

        let mut next = self.entries.clone();
        next[index].apply(draft, Utc::now());

        self.commit(next)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let index = self.index_of(id)?;

        let mut next = self.entries.clone();
        next.remove(index);

        self.commit(next)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    fn commit(&mut self, next: Vec<CredentialEntry>) -> Result<()> {
        self.persist(&next)?;
        self.entries = next;
        Ok(())
    }

    fn persist(&self, entries: &[CredentialEntry]) -> Result<()> {
        format::write_vault(&self.path, &self.header, &entries, &self.master_key)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn header(&self) -> &VaultHeader {
        &self.header
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn index_of(&self, id: &str) -> Result<usize> {
        self.entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| PassKeeperError::EntryNotFound(id.to_string()))
    }

    /// Reject a draft whose (title, username) pair belongs to another entry.
    fn check_unique(&self, draft: &EntryDraft, skip: Option<usize>) -> Result<()> {
        let key = draft.identity_key();
        let clash = self
            .entries
            .iter()
            .enumerate()
            .any(|(i, e)| Some(i) != skip && e.identity_key() == key);

        if clash {
            return Err(PassKeeperError::DuplicateEntry {
                title: draft.title.trim().to_string(),
                username: draft.username.trim().to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_kib: 8_192,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn new_store(dir: &TempDir) -> VaultStore {
        VaultStore::create(&dir.path().join("passwords.vault"), b"master-pw", &fast_params())
            .unwrap()
    }

    #[test]
    fn create_refuses_existing_file() {
        let tmp = TempDir::new().unwrap();
        let _store = new_store(&tmp);
        let again = VaultStore::create(
            &tmp.path().join("passwords.vault"),
            b"master-pw",
            &fast_params(),
        );
        assert!(matches!(again, Err(PassKeeperError::VaultAlreadyExists(_))));
    }

    #[test]
    fn entries_survive_reopen_in_order() {
        let tmp = TempDir::new().unwrap();
        let mut store = new_store(&tmp);
        let a = store.add(&EntryDraft::new("Bank", "alice", "p1")).unwrap();
        let b = store.add(&EntryDraft::new("Mail", "alice", "p2")).unwrap();

        let reopened = VaultStore::open(store.path(), b"master-pw").unwrap();
        let ids: Vec<&str> = reopened.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec![a.as_str(), b.as_str()]);
        assert_eq!(reopened.get(&b).unwrap().password, "p2");
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let tmp = TempDir::new().unwrap();
        let store = new_store(&tmp);
        let result = VaultStore::open(store.path(), b"not-it");
        assert!(matches!(result, Err(PassKeeperError::InvalidCredentials)));
    }

    #[test]
    fn duplicate_pair_rejected_on_add_and_update() {
        let tmp = TempDir::new().unwrap();
        let mut store = new_store(&tmp);
        store.add(&EntryDraft::new("Bank", "alice", "p")).unwrap();
        let other = store.add(&EntryDraft::new("Mail", "alice", "p")).unwrap();

        let dup = store.add(&EntryDraft::new("bank", "alice", "q"));
        assert!(matches!(dup, Err(PassKeeperError::DuplicateEntry { .. })));

        let clash = store.update(&other, &EntryDraft::new("BANK", "alice", "q"));
        assert!(matches!(clash, Err(PassKeeperError::DuplicateEntry { .. })));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn update_keeps_id_and_created_at() {
        let tmp = TempDir::new().unwrap();
        let mut store = new_store(&tmp);
        let id = store.add(&EntryDraft::new("Bank", "alice", "p")).unwrap();
        let created = store.get(&id).unwrap().created_at;

        store
            .update(&id, &EntryDraft::new("Bank", "alice", "new"))
            .unwrap();

        let entry = store.get(&id).unwrap();
        assert_eq!(entry.password, "new");
        assert_eq!(entry.created_at, created);
        assert!(entry.updated_at >= created);
    }

    #[test]
    fn missing_ids_are_not_found() {
        let tmp = TempDir::new().unwrap();
        let mut store = new_store(&tmp);
        let id = store.add(&EntryDraft::new("Bank", "alice", "p")).unwrap();
        store.delete(&id).unwrap();

        assert!(store.delete(&id).unwrap_err().is_not_found());
        assert!(store
            .update(&id, &EntryDraft::new("Bank", "alice", "p"))
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn search_filters_entries() {
        let tmp = TempDir::new().unwrap();
        let mut store = new_store(&tmp);
        store.add(&EntryDraft::new("GitHub", "alice", "p")).unwrap();
        store.add(&EntryDraft::new("Bank", "bob", "p")).unwrap();

        let hits = store.search("git");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "GitHub");
        assert_eq!(store.search("").len(), 2);
    }
}
