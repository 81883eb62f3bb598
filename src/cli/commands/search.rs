//! `passkeeper search`: find entries by title, username or url.

use crate::cli::{output, AppContext};
use crate::errors::Result;

/// Execute the `search` command.
pub async fn execute(ctx: &AppContext, query: &str) -> Result<()> {
    let client = ctx.unlocked_client().await?;
    let hits = client.search(query).await?;
    client.session().lock().await;

    if hits.is_empty() {
        output::info(&format!("No entries match '{query}'."));
        return Ok(());
    }
    output::print_entries_table(&hits);
    Ok(())
}
