//! `passkeeper account ...`: provisioning and per-account service records.

use crate::cli::{output, prompt_account_password, prompt_secret, AccountAction, AppContext};
use crate::client::AccountClient;
use crate::errors::{PassKeeperError, Result};

/// Execute an `account` subcommand.
pub async fn execute(ctx: &AppContext, action: AccountAction) -> Result<()> {
    let client = AccountClient::new(ctx.session().await);

    match action {
        AccountAction::Create { username } => create(&client, &username).await,
        AccountAction::Services { username } => {
            with_login(&client, &username, async {
                let records = client.services().await?;
                output::info(&format!("{} service record(s) for {username}", records.len()));
                output::print_services_table(&records);
                Ok(())
            })
            .await
        }
        AccountAction::Store {
            username,
            service,
            account,
            password,
        } => {
            let password = record_password(password)?;
            with_login(&client, &username, async {
                client.save_service(&service, &account, &password).await?;
                output::success(&format!("Stored {service}/{account}"));
                Ok(())
            })
            .await
        }
        AccountAction::Remove {
            username,
            service,
            account,
        } => {
            with_login(&client, &username, async {
                client.remove_service(&service, &account).await?;
                output::success(&format!("Removed {service}/{account}"));
                Ok(())
            })
            .await
        }
        AccountAction::Modify {
            username,
            service,
            account,
            password,
        } => {
            let password = record_password(password)?;
            with_login(&client, &username, async {
                client.modify_service(&service, &account, &password).await?;
                output::success(&format!("Updated {service}/{account}"));
                Ok(())
            })
            .await
        }
    }
}

async fn create(client: &AccountClient, username: &str) -> Result<()> {
    let password = match std::env::var(crate::cli::ACCOUNT_PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => zeroize::Zeroizing::new(pw),
        _ => {
            let pw = dialoguer::Password::new()
                .with_prompt(format!("Choose password for {username}"))
                .with_confirmation("Confirm password", "Passwords do not match, try again")
                .interact()
                .map_err(|e| PassKeeperError::CommandFailed(format!("password prompt: {e}")))?;
            zeroize::Zeroizing::new(pw)
        }
    };

    client.create_account(username, &password).await?;
    output::success(&format!("Account '{username}' created"));
    Ok(())
}

/// Log in, run `work`, then log out again whatever the outcome.
async fn with_login<F>(client: &AccountClient, username: &str, work: F) -> Result<()>
where
    F: std::future::Future<Output = Result<()>>,
{
    let password = prompt_account_password(username)?;
    if !client.login(username, &password).await? {
        return Err(PassKeeperError::InvalidCredentials);
    }

    let result = work.await;
    client.logout().await;
    result
}

fn record_password(given: Option<String>) -> Result<zeroize::Zeroizing<String>> {
    match given {
        Some(pw) if !pw.is_empty() => Ok(zeroize::Zeroizing::new(pw)),
        _ => prompt_secret("Record password"),
    }
}
