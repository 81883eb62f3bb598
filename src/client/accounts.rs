//! Provisioning and identity: account creation, login, and the logged-in
//! user's service records.

use std::sync::Arc;

use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::account::{validate_username, ServiceRecord};
use crate::codes::DataCode;
use crate::errors::{PassKeeperError, Result};
use crate::session::{Identity, VaultSession};

pub struct AccountClient {
    session: Arc<VaultSession>,
    write_guard: tokio::sync::Mutex<()>,
}

impl AccountClient {
    pub fn new(session: Arc<VaultSession>) -> Self {
        Self {
            session,
            write_guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Create an account. Not idempotent: a second call with the same
    /// username fails with `AccountAlreadyExists`.
    pub async fn create_account(&self, username: &str, password: &str) -> Result<()> {
        validate_username(username)?;
        if password.is_empty() {
            return Err(PassKeeperError::InvalidField {
                field: "password",
                reason: "cannot be empty".into(),
            });
        }

        let user = username.to_string();
        let secret = Zeroizing::new(password.to_string());
        let code = self
            .session
            .caller()
            .call("save_account", move |b| b.save_account(&user, &secret))
            .await?;

        code.into_result(username)?;
        info!(username, "account created");
        Ok(())
    }

    /// Check credentials. On success the identity is recorded in the
    /// session; on failure nothing changes.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool> {
        let user = username.to_string();
        let secret = Zeroizing::new(password.to_string());
        let valid = self
            .session
            .caller()
            .call("validate_login", move |b| b.validate_login(&user, &secret))
            .await?;

        if !valid {
            warn!("invalid username or password");
            return Ok(false);
        }

        if let Some(previous) = self.session.set_identity(Identity::new(username)) {
            if previous.username != username {
                self.end_backend_login(previous.username).await;
            }
        }
        info!(username, "logged in");
        Ok(true)
    }

    /// Clear the identity and end its backend login.
    pub async fn logout(&self) {
        if let Some(identity) = self.session.clear_identity() {
            info!(username = %identity.username, "logged out");
            self.end_backend_login(identity.username).await;
        }
    }

    pub fn current_user(&self) -> Option<String> {
        self.session.identity().map(|i| i.username)
    }

    // ------------------------------------------------------------------
    // Service records of the logged-in user
    // ------------------------------------------------------------------

    pub async fn services(&self) -> Result<Vec<ServiceRecord>> {
        let user = self.require_identity()?;
        let who = user.clone();
        let loaded = self
            .session
            .caller()
            .call("get_data", move |b| b.get_data(&who))
            .await?;

        loaded.or_else(|code| match code.into_result("get_data", &user, "", "") {
            Ok(()) => Err(PassKeeperError::Unknown {
                operation: "get_data",
                code: code.as_raw(),
            }),
            Err(e) => Err(e),
        })
    }

    pub async fn save_service(&self, service: &str, account: &str, password: &str) -> Result<()> {
        let user = self.require_identity()?;
        let (who, svc, acct) = (user.clone(), service.to_string(), account.to_string());
        let secret = Zeroizing::new(password.to_string());

        let _flight = self.write_guard.lock().await;
        let code = self
            .session
            .caller()
            .call("save_data", move |b| b.save_data(&who, &svc, &acct, &secret))
            .await?;
        code.into_result("save_data", &user, service, account)
    }

    pub async fn modify_service(
        &self,
        service: &str,
        account: &str,
        password: &str,
    ) -> Result<()> {
        let user = self.require_identity()?;
        let (who, svc, acct) = (user.clone(), service.to_string(), account.to_string());
        let secret = Zeroizing::new(password.to_string());

        let _flight = self.write_guard.lock().await;
        let code = self
            .session
            .caller()
            .call("modify_data", move |b| {
                b.modify_data(&who, &svc, &acct, &secret)
            })
            .await?;
        code.into_result("modify_data", &user, service, account)
    }

    pub async fn remove_service(&self, service: &str, account: &str) -> Result<()> {
        let user = self.require_identity()?;
        let (who, svc, acct) = (user.clone(), service.to_string(), account.to_string());

        let _flight = self.write_guard.lock().await;
        let code: DataCode = self
            .session
            .caller()
            .call("remove_data", move |b| b.remove_data(&who, &svc, &acct))
            .await?;
        code.into_result("remove_data", &user, service, account)
    }

    fn require_identity(&self) -> Result<String> {
        self.current_user().ok_or(PassKeeperError::NotLoggedIn)
    }

    async fn end_backend_login(&self, username: String) {
        let ended = self
            .session
            .caller()
            .call("logout", move |b| b.logout(&username))
            .await;
        if let Err(e) = ended {
            warn!(error = %e, "backend logout failed");
        }
    }
}
