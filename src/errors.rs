use thiserror::Error;

/// All errors that can occur in PassKeeper.
#[derive(Debug, Error)]
pub enum PassKeeperError {
    // --- Validation errors ---
    #[error("Duplicate entry for '{title}' / '{username}'")]
    DuplicateEntry { title: String, username: String },

    #[error("Empty character pool: enable at least one character class")]
    EmptyCharacterPool,

    #[error("Invalid password length {length} (must be between {min} and {max})")]
    InvalidLength {
        length: usize,
        min: usize,
        max: usize,
    },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Account '{0}' already exists")]
    AccountAlreadyExists(String),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(std::path::PathBuf),

    #[error("Password must be at least {0} characters")]
    PasswordTooShort(usize),

    #[error("Config file error: {0}")]
    ConfigError(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,

    // --- Not-found errors ---
    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Record '{0}' not found")]
    RecordNotFound(String),

    #[error("Data file for '{0}' does not exist")]
    StoreMissing(String),

    // --- IO errors ---
    #[error("Failed to create data directory: {0}")]
    DirectoryCreateFailed(String),

    #[error("Failed to write data to file: {0}")]
    WriteFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend did not answer '{operation}' within {secs}s")]
    BackendTimeout { operation: &'static str, secs: u64 },

    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: data is corrupted or the key is unavailable")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Authorization errors ---
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Vault is locked, unlock it first")]
    Locked,

    #[error("Not logged in")]
    NotLoggedIn,

    // --- Catch-all ---
    #[error("'{operation}' failed with unrecognized result code {code}")]
    Unknown { operation: &'static str, code: i32 },
}

/// Coarse classification used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    IoFailure,
    CryptoFailure,
    Unauthorized,
    Unknown,
}

impl PassKeeperError {
    pub fn kind(&self) -> ErrorKind {
        use PassKeeperError::*;
        match self {
            DuplicateEntry { .. }
            | EmptyCharacterPool
            | InvalidLength { .. }
            | InvalidField { .. }
            | AccountAlreadyExists(_)
            | VaultAlreadyExists(_)
            | PasswordTooShort(_)
            | ConfigError(_)
            | CommandFailed(_)
            | UserCancelled => ErrorKind::Validation,

            EntryNotFound(_) | RecordNotFound(_) | StoreMissing(_) => ErrorKind::NotFound,

            DirectoryCreateFailed(_)
            | WriteFailed(_)
            | Io(_)
            | BackendTimeout { .. }
            | BackendUnavailable(_)
            | InvalidVaultFormat(_)
            | SerializationError(_) => ErrorKind::IoFailure,

            EncryptionFailed(_) | DecryptionFailed | KeyDerivationFailed(_) => {
                ErrorKind::CryptoFailure
            }

            InvalidCredentials | Locked | NotLoggedIn => ErrorKind::Unauthorized,

            Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// Returns `true` for failures caused by a missing entry or record.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

/// Convenience type alias for PassKeeper results.
pub type Result<T> = std::result::Result<T, PassKeeperError>;
