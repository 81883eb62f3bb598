//! Structured result codes returned by the backend command surface.
//!
//! The backend reports provisioning and per-account data outcomes as small
//! integers. Each operation family gets its own closed enum so a raw `2`
//! can never be confused between "account already exists" and "data file
//! missing". Every enum carries an `Unknown` catch-all: unrecognized codes
//! are preserved for diagnostics and always normalize to an error.

use crate::errors::{PassKeeperError, Result};

/// Outcome of `save_account`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountCode {
    Ok,
    DirectoryCreateFailed,
    AlreadyExists,
    Unknown(i32),
}

impl AccountCode {
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::DirectoryCreateFailed,
            2 => Self::AlreadyExists,
            other => Self::Unknown(other),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::DirectoryCreateFailed => 1,
            Self::AlreadyExists => 2,
            Self::Unknown(code) => code,
        }
    }

    /// Normalize into a `Result`. Only `Ok` is a success.
    pub fn into_result(self, username: &str) -> Result<()> {
        match self {
            Self::Ok => Ok(()),
            Self::DirectoryCreateFailed => Err(PassKeeperError::DirectoryCreateFailed(format!(
                "account storage for '{username}'"
            ))),
            Self::AlreadyExists => Err(PassKeeperError::AccountAlreadyExists(username.to_string())),
            Self::Unknown(code) => Err(PassKeeperError::Unknown {
                operation: "save_account",
                code,
            }),
        }
    }
}

/// Outcome of `save_data`, `remove_data`, `modify_data` and `get_data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataCode {
    Ok,
    FileMissing,
    NotFound,
    WriteFailed,
    DuplicateEntry,
    EncryptionFailed,
    DecryptionFailed,
    Unknown(i32),
}

impl DataCode {
    pub fn from_raw(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            2 => Self::FileMissing,
            3 => Self::NotFound,
            4 => Self::WriteFailed,
            5 => Self::DuplicateEntry,
            6 => Self::EncryptionFailed,
            7 => Self::DecryptionFailed,
            other => Self::Unknown(other),
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::FileMissing => 2,
            Self::NotFound => 3,
            Self::WriteFailed => 4,
            Self::DuplicateEntry => 5,
            Self::EncryptionFailed => 6,
            Self::DecryptionFailed => 7,
            Self::Unknown(code) => code,
        }
    }

    /// Normalize into a `Result`.
    ///
    /// `operation` names the backend command for `Unknown` diagnostics;
    /// `username`, `service` and `account` describe the record for messages.
    pub fn into_result(
        self,
        operation: &'static str,
        username: &str,
        service: &str,
        account: &str,
    ) -> Result<()> {
        match self {
            Self::Ok => Ok(()),
            Self::FileMissing => Err(PassKeeperError::StoreMissing(username.to_string())),
            Self::NotFound => Err(PassKeeperError::RecordNotFound(format!("{service}/{account}"))),
            Self::WriteFailed => Err(PassKeeperError::WriteFailed(format!(
                "service records for '{username}'"
            ))),
            Self::DuplicateEntry => Err(PassKeeperError::DuplicateEntry {
                title: service.to_string(),
                username: account.to_string(),
            }),
            Self::EncryptionFailed => Err(PassKeeperError::EncryptionFailed(format!(
                "service records for '{username}'"
            ))),
            Self::DecryptionFailed => Err(PassKeeperError::DecryptionFailed),
            Self::Unknown(code) => Err(PassKeeperError::Unknown { operation, code }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn account_codes_map_from_raw() {
        assert_eq!(AccountCode::from_raw(0), AccountCode::Ok);
        assert_eq!(AccountCode::from_raw(1), AccountCode::DirectoryCreateFailed);
        assert_eq!(AccountCode::from_raw(2), AccountCode::AlreadyExists);
        assert_eq!(AccountCode::from_raw(9), AccountCode::Unknown(9));
        assert_eq!(AccountCode::from_raw(-1).as_raw(), -1);
    }

    #[test]
    fn data_codes_map_from_raw() {
        let expected = [
            (0, DataCode::Ok),
            (2, DataCode::FileMissing),
            (3, DataCode::NotFound),
            (4, DataCode::WriteFailed),
            (5, DataCode::DuplicateEntry),
            (6, DataCode::EncryptionFailed),
            (7, DataCode::DecryptionFailed),
        ];
        for (raw, code) in expected {
            assert_eq!(DataCode::from_raw(raw), code);
            assert_eq!(code.as_raw(), raw);
        }
        // 1 is an account-only code and means nothing for data operations.
        assert_eq!(DataCode::from_raw(1), DataCode::Unknown(1));
    }

    #[test]
    fn unknown_codes_never_succeed() {
        for raw in [1, 8, 99, -7, i32::MAX] {
            let err = DataCode::from_raw(raw)
                .into_result("save_data", "alice", "mail", "alice@example.com")
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unknown);
        }
        for raw in [3, 100, -1] {
            let err = AccountCode::from_raw(raw).into_result("alice").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unknown);
        }
    }

    #[test]
    fn already_exists_is_validation() {
        let err = AccountCode::AlreadyExists.into_result("alice").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("alice"));
    }

    #[test]
    fn missing_file_and_missing_record_are_both_not_found() {
        let missing = DataCode::FileMissing
            .into_result("modify_data", "alice", "mail", "a")
            .unwrap_err();
        let absent = DataCode::NotFound
            .into_result("modify_data", "alice", "mail", "a")
            .unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert_eq!(absent.kind(), ErrorKind::NotFound);
        assert!(matches!(missing, PassKeeperError::StoreMissing(_)));
        assert!(matches!(absent, PassKeeperError::RecordNotFound(_)));
    }
}
