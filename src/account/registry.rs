//! On-disk account registry.
//!
//! Layout under the accounts directory:
//!
//! ```text
//! accounts/<username>/account.json    salt, Argon2 params, login verifier
//! accounts/<username>/services.vault  encrypted Vec<ServiceRecord>
//! ```
//!
//! Provisioning reports `AccountCode`s and service-record operations report
//! `DataCode`s, mirroring the backend command surface.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use zeroize::Zeroize;

use crate::codes::{AccountCode, DataCode};
use crate::crypto::kdf::{derive_master_key, generate_salt, Argon2Params};
use crate::crypto::keys::MasterKey;
use crate::errors::PassKeeperError;
use crate::vault::format::{self, VaultHeader};

use super::record::{validate_username, AccountRecord, ServiceRecord};

const RECORD_FILE: &str = "account.json";
const SERVICES_FILE: &str = "services.vault";

pub struct AccountRegistry {
    root: PathBuf,
    params: Argon2Params,
}

impl AccountRegistry {
    pub fn new(root: impl Into<PathBuf>, params: Argon2Params) -> Self {
        Self {
            root: root.into(),
            params,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn account_dir(&self, username: &str) -> PathBuf {
        self.root.join(username)
    }

    fn services_path(&self, username: &str) -> PathBuf {
        self.account_dir(username).join(SERVICES_FILE)
    }

    pub fn exists(&self, username: &str) -> bool {
        validate_username(username).is_ok()
            && self.account_dir(username).join(RECORD_FILE).exists()
    }

    // ------------------------------------------------------------------
    // Provisioning
    // ------------------------------------------------------------------

    /// Create a new account with an empty service-record vault.
    pub fn create(&self, username: &str, password: &str) -> AccountCode {
        if validate_username(username).is_err() {
            return AccountCode::DirectoryCreateFailed;
        }
        if self.exists(username) {
            return AccountCode::AlreadyExists;
        }

        let dir = self.account_dir(username);
        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(error = %e, "could not create account directory");
            return AccountCode::DirectoryCreateFailed;
        }

        match self.provision(username, password, &dir) {
            Ok(()) => AccountCode::Ok,
            Err(e) => {
                warn!(error = %e, "account provisioning failed");
                let _ = fs::remove_dir_all(&dir);
                AccountCode::DirectoryCreateFailed
            }
        }
    }

    fn provision(&self, username: &str, password: &str, dir: &Path) -> crate::errors::Result<()> {
        let salt = generate_salt();
        let mut master_bytes =
            derive_master_key(password.as_bytes(), &salt, &self.params)?;
        let key = MasterKey::new(master_bytes);
        master_bytes.zeroize();

        let mut verifier = key.derive_login_verifier()?;
        let record = AccountRecord {
            username: username.to_string(),
            salt: salt.to_vec(),
            argon2_params: self.params,
            verifier: verifier.to_vec(),
            created_at: Utc::now(),
        };
        verifier.zeroize();

        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| PassKeeperError::SerializationError(format!("account record: {e}")))?;
        fs::write(dir.join(RECORD_FILE), json)?;

        let header = VaultHeader::new(salt.to_vec(), username, self.params);
        format::write_vault(
            &dir.join(SERVICES_FILE),
            &header,
            &Vec::<ServiceRecord>::new(),
            &key,
        )
    }

    /// Check a login. Returns the account key on success.
    ///
    /// Unknown accounts still pay for one key derivation so the time taken
    /// does not reveal whether the username exists.
    pub fn verify(&self, username: &str, password: &str) -> Option<MasterKey> {
        let record = match self.load_record(username) {
            Some(record) => record,
            None => {
                let _ = derive_master_key(
                    password.as_bytes(),
                    &generate_salt(),
                    &self.params,
                );
                return None;
            }
        };

        let mut master_bytes =
            derive_master_key(password.as_bytes(), &record.salt, &record.argon2_params)
                .ok()?;
        let key = MasterKey::new(master_bytes);
        master_bytes.zeroize();

        let mut candidate = key.derive_login_verifier().ok()?;
        let matches: bool = candidate[..].ct_eq(&record.verifier[..]).into();
        candidate.zeroize();

        matches.then_some(key)
    }

    fn load_record(&self, username: &str) -> Option<AccountRecord> {
        if validate_username(username).is_err() {
            return None;
        }
        let bytes = fs::read(self.account_dir(username).join(RECORD_FILE)).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "unreadable account record");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Service records
    // ------------------------------------------------------------------

    /// Decrypt and return every service record of `username`.
    pub fn load_services(
        &self,
        username: &str,
        key: &MasterKey,
    ) -> std::result::Result<Vec<ServiceRecord>, DataCode> {
        self.read_services(username, key).map(|(_, records)| records)
    }

    pub fn save_service(
        &self,
        username: &str,
        key: &MasterKey,
        service: &str,
        account: &str,
        password: &str,
    ) -> DataCode {
        let (header, mut records) = match self.read_services(username, key) {
            Ok(loaded) => loaded,
            Err(code) => return code,
        };
        if records.iter().any(|r| r.is(service, account)) {
            return DataCode::DuplicateEntry;
        }
        records.push(ServiceRecord::new(service, account, password));
        self.write_services(username, &header, &records, key)
    }

    pub fn modify_service(
        &self,
        username: &str,
        key: &MasterKey,
        service: &str,
        account: &str,
        password: &str,
    ) -> DataCode {
        let (header, mut records) = match self.read_services(username, key) {
            Ok(loaded) => loaded,
            Err(code) => return code,
        };
        let Some(record) = records.iter_mut().find(|r| r.is(service, account)) else {
            return DataCode::NotFound;
        };
        record.password.zeroize();
        record.password = password.to_string();
        record.updated_at = Utc::now();
        self.write_services(username, &header, &records, key)
    }

    pub fn remove_service(
        &self,
        username: &str,
        key: &MasterKey,
        service: &str,
        account: &str,
    ) -> DataCode {
        let (header, mut records) = match self.read_services(username, key) {
            Ok(loaded) => loaded,
            Err(code) => return code,
        };
        let before = records.len();
        records.retain(|r| !r.is(service, account));
        if records.len() == before {
            return DataCode::NotFound;
        }
        self.write_services(username, &header, &records, key)
    }

    fn read_services(
        &self,
        username: &str,
        key: &MasterKey,
    ) -> std::result::Result<(VaultHeader, Vec<ServiceRecord>), DataCode> {
        if validate_username(username).is_err() {
            return Err(DataCode::FileMissing);
        }
        let raw = format::read_vault(&self.services_path(username)).map_err(|e| match e {
            PassKeeperError::StoreMissing(_) => DataCode::FileMissing,
            other => {
                debug!(error = %other, "service records unreadable");
                DataCode::DecryptionFailed
            }
        })?;
        let records = raw
            .open_payload(key)
            .map_err(|_| DataCode::DecryptionFailed)?;
        Ok((raw.header, records))
    }

    fn write_services(
        &self,
        username: &str,
        header: &VaultHeader,
        records: &[ServiceRecord],
        key: &MasterKey,
    ) -> DataCode {
        match format::write_vault(&self.services_path(username), header, &records, key) {
            Ok(()) => DataCode::Ok,
            Err(PassKeeperError::EncryptionFailed(_) | PassKeeperError::KeyDerivationFailed(_)) => {
                DataCode::EncryptionFailed
            }
            Err(e) => {
                warn!(error = %e, "could not write service records");
                DataCode::WriteFailed
            }
        }
    }
}
