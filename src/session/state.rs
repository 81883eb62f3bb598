use crate::vault::CredentialEntry;

/// The access gate.
///
/// The cache lives inside `Unlocked`, so a locked session has nowhere to
/// keep credential data; moving to `Locked` drops (and zeroizes) it.
#[derive(Default)]
pub enum SessionState {
    #[default]
    Locked,
    Unlocked {
        /// Last list the backend returned, in backend order.
        cache: Vec<CredentialEntry>,
    },
}

impl SessionState {
    pub fn is_unlocked(&self) -> bool {
        matches!(self, Self::Unlocked { .. })
    }

    pub fn entries(&self) -> &[CredentialEntry] {
        match self {
            Self::Locked => &[],
            Self::Unlocked { cache } => cache,
        }
    }
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Locked => f.write_str("Locked"),
            Self::Unlocked { cache } => write!(f, "Unlocked({} cached)", cache.len()),
        }
    }
}
