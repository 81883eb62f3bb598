//! `passkeeper edit`: change fields of an existing entry.
//!
//! Fields not given on the command line keep their current value.

use crate::cli::{output, prompt_secret, AppContext};
use crate::errors::Result;

/// Field overrides for an edit.
#[derive(Default)]
pub struct EditArgs {
    pub title: Option<String>,
    pub username: Option<String>,
    pub url: Option<String>,
    pub notes: Option<String>,
    pub prompt_password: bool,
    pub generate: bool,
}

/// Execute the `edit` command.
pub async fn execute(ctx: &AppContext, id: &str, args: EditArgs) -> Result<()> {
    let client = ctx.unlocked_client().await?;

    let result: Result<()> = async {
        let current = client.get(id).await?;
        let mut draft = current.to_draft();

        if let Some(title) = args.title {
            draft.title = title;
        }
        if let Some(username) = args.username {
            draft.username = username;
        }
        if args.url.is_some() {
            draft = draft.with_url(args.url);
        }
        if args.notes.is_some() {
            draft = draft.with_notes(args.notes);
        }
        if args.generate {
            draft.password = client
                .generate_with_policy(ctx.settings.generator_policy())
                .await?;
        } else if args.prompt_password {
            draft.password = prompt_secret("New password")?.to_string();
        }

        client.update(id, draft).await
    }
    .await;

    client.session().lock().await;
    result?;

    output::success(&format!("Updated entry {id}"));
    Ok(())
}
