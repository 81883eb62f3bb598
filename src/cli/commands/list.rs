//! `passkeeper list`: display all entries in a table.

use crate::cli::{output, AppContext};
use crate::errors::Result;

/// Execute the `list` command.
pub async fn execute(ctx: &AppContext) -> Result<()> {
    let client = ctx.unlocked_client().await?;
    let entries = client.list().await?;

    output::info(&format!("{} entr(ies)", entries.len()));
    output::print_entries_table(&entries);

    client.session().lock().await;
    Ok(())
}
