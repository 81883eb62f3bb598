//! The vault session: Locked/Unlocked gate, cache lifetime and identity.
//!
//! `VaultSession` is the only owner of decrypted entries on the client
//! side. Entries enter it only from a full backend list and leave it on
//! lock. Its mutexes are held for short synchronous sections and never
//! across an `.await`.

pub mod identity;
pub mod state;

pub use identity::Identity;
pub use state::SessionState;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::backend::Backend;
use crate::client::dispatch::BackendCaller;
use crate::errors::{PassKeeperError, Result};
use crate::vault::CredentialEntry;

pub struct VaultSession {
    caller: BackendCaller,
    state: Mutex<SessionState>,
    identity: Mutex<Option<Identity>>,
    /// Set when a committed write could not be followed by a list.
    stale: AtomicBool,
}

impl VaultSession {
    /// A session that starts `Locked` without asking the backend.
    pub fn new(caller: BackendCaller) -> Self {
        Self {
            caller,
            state: Mutex::new(SessionState::Locked),
            identity: Mutex::new(None),
            stale: AtomicBool::new(false),
        }
    }

    /// Start a session, adopting the backend's current lock state.
    ///
    /// If the backend is already unlocked the cache is loaded and the
    /// session starts `Unlocked`. Any failure along the way leaves it
    /// `Locked`.
    pub async fn start(backend: Arc<dyn Backend>, timeout: Duration) -> Self {
        let session = Self::new(BackendCaller::new(backend, timeout));

        match session.caller.call("is_unlocked", |b| b.is_unlocked()).await {
            Ok(true) => match session.fetch_all().await {
                Ok(entries) => {
                    *session.state() = SessionState::Unlocked { cache: entries };
                    info!("backend already unlocked, session resumed");
                }
                Err(e) => warn!(error = %e, "could not load entries, staying locked"),
            },
            Ok(false) => {}
            Err(e) => warn!(error = %e, "could not query lock state, staying locked"),
        }

        session
    }

    pub fn caller(&self) -> &BackendCaller {
        &self.caller
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn identity_slot(&self) -> MutexGuard<'_, Option<Identity>> {
        self.identity.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// `Locked -> Unlocked` if the backend accepts `secret`.
    ///
    /// The cache is rebuilt from a full list. If that list fails the
    /// backend is told to lock again and the session stays `Locked`.
    /// A rejected secret on an unlocked session locks it: the backend
    /// has already dropped its vault.
    pub async fn authorize(&self, secret: &str) -> Result<()> {
        let secret = Zeroizing::new(secret.to_string());
        let unlocked = self
            .caller
            .call("unlock_storage", move |b| b.unlock_storage(&secret))
            .await
            .and_then(|r| r);

        if let Err(e) = unlocked {
            warn!(error = %e, "unlock failed");
            if self.is_unlocked() {
                self.lock().await;
            }
            return Err(e);
        }

        match self.fetch_all().await {
            Ok(entries) => {
                *self.state() = SessionState::Unlocked { cache: entries };
                self.stale.store(false, Ordering::SeqCst);
                info!("vault unlocked");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "unlocked but could not list entries, locking again");
                self.lock().await;
                Err(e)
            }
        }
    }

    /// `Unlocked -> Locked`. Always succeeds.
    ///
    /// Cache and identity are gone before the backend is even asked to
    /// lock.
    pub async fn lock(&self) {
        *self.state() = SessionState::Locked;
        self.identity_slot().take();
        self.stale.store(false, Ordering::SeqCst);
        info!("vault locked");

        if let Err(e) = self.caller.call("lock_storage", |b| b.lock_storage()).await {
            warn!(error = %e, "backend did not confirm lock");
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn is_unlocked(&self) -> bool {
        self.state().is_unlocked()
    }

    /// Guard passed by every credential operation.
    pub fn ensure_unlocked(&self) -> Result<()> {
        if self.is_unlocked() {
            Ok(())
        } else {
            Err(PassKeeperError::Locked)
        }
    }

    /// Snapshot of the cache; empty while locked.
    pub fn cached_entries(&self) -> Vec<CredentialEntry> {
        self.state().entries().to_vec()
    }

    /// Replace the cache wholesale with a list the backend returned.
    ///
    /// Does nothing if the session was locked in the meantime, so a late
    /// refresh can never repopulate a locked session. Returns whether the
    /// cache was replaced.
    pub(crate) fn replace_cache(&self, entries: Vec<CredentialEntry>) -> bool {
        let mut state = self.state();
        match &mut *state {
            SessionState::Unlocked { cache } => {
                *cache = entries;
                self.stale.store(false, Ordering::SeqCst);
                true
            }
            SessionState::Locked => false,
        }
    }

    /// Whether the cache is known to lag behind the backend.
    ///
    /// True after a committed mutation whose refresh failed, until the
    /// next successful list or lock.
    pub fn is_stale(&self) -> bool {
        self.stale.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_stale(&self) {
        if self.is_unlocked() {
            self.stale.store(true, Ordering::SeqCst);
        }
    }

    async fn fetch_all(&self) -> Result<Vec<CredentialEntry>> {
        self.caller
            .call("get_all_passwords", |b| b.get_all_passwords())
            .await?
    }

    // ------------------------------------------------------------------
    // Identity
    // ------------------------------------------------------------------

    pub fn identity(&self) -> Option<Identity> {
        self.identity_slot().clone()
    }

    pub(crate) fn set_identity(&self, identity: Identity) -> Option<Identity> {
        self.identity_slot().replace(identity)
    }

    pub(crate) fn clear_identity(&self) -> Option<Identity> {
        self.identity_slot().take()
    }
}
