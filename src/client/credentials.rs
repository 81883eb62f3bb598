//! Credential store client: CRUD against the backend plus cache refresh.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::{PassKeeperError, Result};
use crate::generator::GeneratorPolicy;
use crate::session::VaultSession;
use crate::vault::{CredentialEntry, EntryDraft};

/// Issues credential operations on behalf of an unlocked session.
///
/// Mutations go through a single-flight guard: a second mutation waits
/// for the first to finish, and every successful one is followed by a full
/// list that replaces the session cache. Failed operations leave the cache
/// untouched.
pub struct CredentialClient {
    session: Arc<VaultSession>,
    write_guard: tokio::sync::Mutex<()>,
}

impl CredentialClient {
    pub fn new(session: Arc<VaultSession>) -> Self {
        Self {
            session,
            write_guard: tokio::sync::Mutex::new(()),
        }
    }

    pub fn session(&self) -> &Arc<VaultSession> {
        &self.session
    }

    /// Cached entries from the last list; empty while locked.
    pub fn entries(&self) -> Vec<CredentialEntry> {
        self.session.cached_entries()
    }

    /// True when a write committed but its refresh failed, so
    /// [`entries`](Self::entries) misses it until the next `list`.
    pub fn is_stale(&self) -> bool {
        self.session.is_stale()
    }

    /// Fetch every entry and make that list the new cache.
    ///
    /// Runs under the same guard as mutations so a list issued before a
    /// write cannot land after that write's refresh.
    pub async fn list(&self) -> Result<Vec<CredentialEntry>> {
        let _flight = self.write_guard.lock().await;
        self.session.ensure_unlocked()?;
        let entries = self
            .session
            .caller()
            .call("get_all_passwords", |b| b.get_all_passwords())
            .await??;
        self.session.replace_cache(entries.clone());
        Ok(entries)
    }

    pub async fn get(&self, id: &str) -> Result<CredentialEntry> {
        self.session.ensure_unlocked()?;
        let lookup = id.to_string();
        self.session
            .caller()
            .call("get_password", move |b| b.get_password(&lookup))
            .await??
            .ok_or_else(|| PassKeeperError::EntryNotFound(id.to_string()))
    }

    pub async fn search(&self, query: &str) -> Result<Vec<CredentialEntry>> {
        self.session.ensure_unlocked()?;
        let query = query.to_string();
        self.session
            .caller()
            .call("search_passwords", move |b| b.search_passwords(&query))
            .await?
    }

    /// Add an entry and return the id the backend assigned.
    pub async fn add(&self, draft: EntryDraft) -> Result<String> {
        draft.validate()?;
        let _flight = self.write_guard.lock().await;
        self.session.ensure_unlocked()?;

        let id = self
            .session
            .caller()
            .call("add_password", move |b| b.add_password(&draft))
            .await??;
        debug!(%id, "add committed");

        self.refresh("add_password").await;
        Ok(id)
    }

    pub async fn update(&self, id: &str, draft: EntryDraft) -> Result<()> {
        draft.validate()?;
        let _flight = self.write_guard.lock().await;
        self.session.ensure_unlocked()?;

        let target = id.to_string();
        self.session
            .caller()
            .call("update_password", move |b| b.update_password(&target, &draft))
            .await??;
        debug!(id, "update committed");

        self.refresh("update_password").await;
        Ok(())
    }

    /// Delete an entry. Deleting an id that is already gone is `EntryNotFound`.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _flight = self.write_guard.lock().await;
        self.session.ensure_unlocked()?;

        let target = id.to_string();
        self.session
            .caller()
            .call("delete_password", move |b| b.delete_password(&target))
            .await??;
        debug!(id, "delete committed");

        self.refresh("delete_password").await;
        Ok(())
    }

    /// Generate a password; lowercase letters are always included.
    ///
    /// Works while locked: nothing is read from or written to the vault.
    pub async fn generate(
        &self,
        length: usize,
        use_uppercase: bool,
        use_numbers: bool,
        use_symbols: bool,
    ) -> Result<String> {
        self.generate_with_policy(GeneratorPolicy::new(
            length,
            use_uppercase,
            use_numbers,
            use_symbols,
        ))
        .await
    }

    pub async fn generate_with_policy(&self, policy: GeneratorPolicy) -> Result<String> {
        policy.validate()?;
        self.session
            .caller()
            .call("generate_password", move |b| b.generate_password(&policy))
            .await?
    }

    /// Rebuild the cache after a committed mutation.
    ///
    /// The mutation already happened, so a failed refresh does not fail it.
    /// The cache keeps the last list the backend returned and is marked
    /// stale.
    async fn refresh(&self, after: &'static str) {
        let listed = self
            .session
            .caller()
            .call("get_all_passwords", |b| b.get_all_passwords())
            .await
            .and_then(|r| r);

        match listed {
            Ok(entries) => {
                if !self.session.replace_cache(entries) {
                    debug!(after, "session locked before refresh landed");
                }
            }
            Err(e) => {
                warn!(after, error = %e, "cache refresh failed");
                self.session.mark_stale();
            }
        }
    }
}
