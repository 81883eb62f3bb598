//! `passkeeper init`: create the credential vault.

use crate::cli::{output, prompt_new_password, AppContext};
use crate::errors::{PassKeeperError, Result};

/// Execute the `init` command.
pub async fn execute(ctx: &AppContext) -> Result<()> {
    if ctx.backend.vault_exists() {
        output::tip("Use `passkeeper add` to add entries to the existing vault.");
        return Err(PassKeeperError::VaultAlreadyExists(
            ctx.backend.vault_path().to_path_buf(),
        ));
    }

    let password = prompt_new_password(ctx.settings.min_master_password_len)?;

    // Unlocking a vault that does not exist yet creates it.
    let session = ctx.session().await;
    session.authorize(&password).await?;
    session.lock().await;

    output::success(&format!(
        "Vault created at {}",
        ctx.backend.vault_path().display()
    ));
    output::tip("Run `passkeeper add --title <TITLE> --username <USER>` to add an entry.");
    output::tip("Run `passkeeper generate` to create a strong password.");

    Ok(())
}
