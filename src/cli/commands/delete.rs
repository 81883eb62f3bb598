//! `passkeeper delete`: remove an entry from the vault.

use crate::cli::{confirm, output, AppContext};
use crate::errors::Result;

/// Execute the `delete` command.
pub async fn execute(ctx: &AppContext, id: &str, force: bool) -> Result<()> {
    let client = ctx.unlocked_client().await?;

    let result: Result<()> = async {
        let entry = client.get(id).await?;

        // Unless --force is set, ask for confirmation before deleting.
        if !force && !confirm(&format!("Delete '{}' ({})?", entry.title, entry.username))? {
            output::info("Cancelled.");
            return Ok(());
        }

        client.delete(id).await?;
        output::success(&format!("Deleted '{}'", entry.title));
        Ok(())
    }
    .await;

    client.session().lock().await;
    result
}
