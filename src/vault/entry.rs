//! Credential entries and the drafts used to create or edit them.
//!
//! Entries travel in plaintext only inside the unlocked session; both
//! types zeroize their string fields on drop and redact the password from
//! `Debug` output.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{PassKeeperError, Result};

/// One stored credential.
#[derive(Clone, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct CredentialEntry {
    /// Backend-assigned identifier, immutable after creation.
    pub id: String,
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    #[zeroize(skip)]
    pub created_at: DateTime<Utc>,
    #[zeroize(skip)]
    pub updated_at: DateTime<Utc>,
}

impl CredentialEntry {
    /// Build a new entry from a validated draft.
    pub(crate) fn from_draft(id: String, draft: &EntryDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            username: draft.username.trim().to_string(),
            password: draft.password.clone(),
            url: draft.url.clone(),
            notes: draft.notes.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite the user-editable fields, keeping `id` and `created_at`.
    pub(crate) fn apply(&mut self, draft: &EntryDraft, now: DateTime<Utc>) {
        self.title = draft.title.trim().to_string();
        self.username = draft.username.trim().to_string();
        self.password.zeroize();
        self.password = draft.password.clone();
        self.url = draft.url.clone();
        self.notes = draft.notes.clone();
        self.updated_at = now;
    }

    /// The (service, account) pair that must be unique within a vault.
    pub fn identity_key(&self) -> (String, String) {
        identity_key(&self.title, &self.username)
    }

    /// Case-insensitive substring match over title, username and url.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.username.to_lowercase().contains(&query)
            || self
                .url
                .as_ref()
                .is_some_and(|u| u.to_lowercase().contains(&query))
    }

    /// Copy the editable fields into a draft, e.g. as the base of an edit.
    pub fn to_draft(&self) -> EntryDraft {
        EntryDraft {
            title: self.title.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            url: self.url.clone(),
            notes: self.notes.clone(),
        }
    }
}

impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("url", &self.url)
            .field("notes", &self.notes.as_ref().map(|_| "<notes>"))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Service identity compares case-insensitively, the account exactly.
pub(crate) fn identity_key(title: &str, username: &str) -> (String, String) {
    (title.trim().to_lowercase(), username.trim().to_string())
}

/// User-supplied fields for `add` and `update`.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct EntryDraft {
    pub title: String,
    pub username: String,
    pub password: String,
    pub url: Option<String>,
    pub notes: Option<String>,
}

impl EntryDraft {
    pub fn new(
        title: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            username: username.into(),
            password: password.into(),
            url: None,
            notes: None,
        }
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = normalize_optional(url);
        self
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = normalize_optional(notes);
        self
    }

    pub fn identity_key(&self) -> (String, String) {
        identity_key(&self.title, &self.username)
    }

    /// Reject drafts with missing required fields.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(PassKeeperError::InvalidField {
                field: "title",
                reason: "cannot be empty".into(),
            });
        }
        if self.username.trim().is_empty() {
            return Err(PassKeeperError::InvalidField {
                field: "username",
                reason: "cannot be empty".into(),
            });
        }
        if self.password.is_empty() {
            return Err(PassKeeperError::InvalidField {
                field: "password",
                reason: "cannot be empty".into(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for EntryDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryDraft")
            .field("title", &self.title)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("url", &self.url)
            .finish_non_exhaustive()
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
