//! `passkeeper add`: store a new entry.

use crate::cli::{output, prompt_secret, AppContext};
use crate::client::CredentialClient;
use crate::errors::Result;
use crate::vault::EntryDraft;

/// User input for a new entry, as parsed from the command line.
pub struct AddArgs {
    pub title: String,
    pub username: String,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub generate: bool,
    pub length: Option<usize>,
}

/// Execute the `add` command.
pub async fn execute(ctx: &AppContext, args: AddArgs) -> Result<()> {
    let client = ctx.unlocked_client().await?;
    let result = add_entry(ctx, &client, args).await;
    client.session().lock().await;

    let id = result?;
    output::success(&format!("Added entry {id}"));
    output::tip(&format!("Run `passkeeper get {id} --show` to view it."));
    Ok(())
}

/// Build the draft (prompting or generating the password) and add it.
pub(crate) async fn add_entry(
    ctx: &AppContext,
    client: &CredentialClient,
    args: AddArgs,
) -> Result<String> {
    let password = if args.generate {
        let mut policy = ctx.settings.generator_policy();
        if let Some(length) = args.length {
            policy.length = length;
        }
        zeroize::Zeroizing::new(client.generate_with_policy(policy).await?)
    } else {
        prompt_secret("Password")?
    };

    let draft = EntryDraft::new(args.title, args.username, password.as_str())
        .with_url(args.url)
        .with_notes(args.notes);

    client.add(draft).await
}
