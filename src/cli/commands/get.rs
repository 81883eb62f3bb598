//! `passkeeper get`: show a single entry, optionally copying its password.

use crate::cli::{output, AppContext};
use crate::errors::{PassKeeperError, Result};

/// Execute the `get` command.
pub async fn execute(ctx: &AppContext, id: &str, show: bool, copy: bool) -> Result<()> {
    let client = ctx.unlocked_client().await?;
    let fetched = client.get(id).await;
    client.session().lock().await;
    let entry = fetched?;

    output::print_entry(&entry, show);

    if copy {
        copy_to_clipboard(&entry.password)?;
        output::success("Password copied to clipboard.");
    }

    Ok(())
}

pub(crate) fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| PassKeeperError::CommandFailed(format!("clipboard unavailable: {e}")))?;
    clipboard
        .set_text(text.to_string())
        .map_err(|e| PassKeeperError::CommandFailed(format!("clipboard write failed: {e}")))
}
