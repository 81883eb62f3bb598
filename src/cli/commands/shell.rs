//! `passkeeper shell`: one unlocked session, many commands.
//!
//! The session, the credential client and the account client share one
//! `VaultSession`, so `lock` here drops the cache and the logged-in
//! identity for everything at once.

use dialoguer::{Input, Password};
use zeroize::Zeroizing;

use crate::cli::{confirm, output, prompt_account_password, prompt_password, AppContext};
use crate::client::{AccountClient, CredentialClient};
use crate::errors::{PassKeeperError, Result};
use crate::vault::EntryDraft;

/// One parsed shell line.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Get { id: String, reveal: bool },
    Add,
    Edit { id: String },
    Delete { id: String },
    Search { query: String },
    Generate { length: Option<usize> },
    Lock,
    Unlock,
    Login { username: String },
    Logout,
    WhoAmI,
    Help,
    Quit,
    Empty,
}

const HELP: &str = "\
list                 list all entries
get <id>             show an entry (password masked)
show <id>            show an entry with its password
add                  add an entry
edit <id>            edit an entry
delete <id>          delete an entry
search <query>       find entries by title, username or url
generate [length]    print a random password
lock | unlock        close or reopen the vault
login <user>         log in to an account
logout | whoami      end or show the account login
help | quit";

/// Parse a line typed at the shell prompt.
pub fn parse_line(line: &str) -> std::result::Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((w, r)) => (w, r.trim()),
        None => (line, ""),
    };

    let required = |what: &str| -> std::result::Result<String, String> {
        if rest.is_empty() {
            Err(format!("usage: {word} <{what}>"))
        } else {
            Ok(rest.to_string())
        }
    };

    let cmd = match word.to_lowercase().as_str() {
        "" => ShellCommand::Empty,
        "list" | "ls" => ShellCommand::List,
        "get" => ShellCommand::Get {
            id: required("id")?,
            reveal: false,
        },
        "show" => ShellCommand::Get {
            id: required("id")?,
            reveal: true,
        },
        "add" => ShellCommand::Add,
        "edit" => ShellCommand::Edit { id: required("id")? },
        "delete" | "rm" => ShellCommand::Delete { id: required("id")? },
        "search" | "find" => ShellCommand::Search {
            query: required("query")?,
        },
        "generate" | "gen" => {
            let length = if rest.is_empty() {
                None
            } else {
                Some(
                    rest.parse::<usize>()
                        .map_err(|_| format!("'{rest}' is not a length"))?,
                )
            };
            ShellCommand::Generate { length }
        }
        "lock" => ShellCommand::Lock,
        "unlock" => ShellCommand::Unlock,
        "login" => ShellCommand::Login {
            username: required("user")?,
        },
        "logout" => ShellCommand::Logout,
        "whoami" => ShellCommand::WhoAmI,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}', try `help`")),
    };
    Ok(cmd)
}

/// Execute the `shell` command.
pub async fn execute(ctx: &AppContext) -> Result<()> {
    let session = ctx.session().await;
    let credentials = CredentialClient::new(session.clone());
    let accounts = AccountClient::new(session.clone());

    if !ctx.backend.vault_exists() {
        output::info("No vault yet; `unlock` will create one with the password you choose.");
    } else if !session.is_unlocked() {
        if let Err(e) = unlock(&credentials).await {
            output::error(&e.to_string());
        }
    }
    output::tip("Type `help` for commands.");

    loop {
        let prompt = match (session.is_unlocked(), accounts.current_user()) {
            (true, Some(user)) => format!("passkeeper[{user}]"),
            (true, None) => "passkeeper".to_string(),
            (false, _) => "passkeeper (locked)".to_string(),
        };
        let line: String = Input::new()
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PassKeeperError::CommandFailed(format!("shell input: {e}")))?;

        let command = match parse_line(&line) {
            Ok(command) => command,
            Err(msg) => {
                output::warning(&msg);
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }

        if let Err(e) = run(ctx, &credentials, &accounts, command).await {
            output::error(&e.to_string());
        }
    }

    session.lock().await;
    output::info("Vault locked. Bye.");
    Ok(())
}

async fn unlock(client: &CredentialClient) -> Result<()> {
    let password = prompt_password()?;
    client.session().authorize(&password).await?;
    output::success(&format!("Unlocked, {} entr(ies).", client.entries().len()));
    Ok(())
}

async fn run(
    ctx: &AppContext,
    credentials: &CredentialClient,
    accounts: &AccountClient,
    command: ShellCommand,
) -> Result<()> {
    match command {
        ShellCommand::Empty | ShellCommand::Quit => {}
        ShellCommand::Help => println!("{HELP}"),
        ShellCommand::List => {
            let entries = credentials.list().await?;
            output::print_entries_table(&entries);
        }
        ShellCommand::Get { id, reveal } => {
            let entry = credentials.get(&id).await?;
            output::print_entry(&entry, reveal);
        }
        ShellCommand::Add => {
            let draft = read_draft(None)?;
            let draft = fill_generated(ctx, credentials, draft).await?;
            let id = credentials.add(draft).await?;
            output::success(&format!("Added entry {id}"));
        }
        ShellCommand::Edit { id } => {
            let current = credentials.get(&id).await?;
            let draft = read_draft(Some(&current.to_draft()))?;
            credentials.update(&id, draft).await?;
            output::success(&format!("Updated entry {id}"));
        }
        ShellCommand::Delete { id } => {
            let entry = credentials.get(&id).await?;
            if confirm(&format!("Delete '{}' ({})?", entry.title, entry.username))? {
                credentials.delete(&id).await?;
                output::success(&format!("Deleted '{}'", entry.title));
            }
        }
        ShellCommand::Search { query } => {
            let hits = credentials.search(&query).await?;
            output::print_entries_table(&hits);
        }
        ShellCommand::Generate { length } => {
            let mut policy = ctx.settings.generator_policy();
            if let Some(length) = length {
                policy.length = length;
            }
            println!("{}", credentials.generate_with_policy(policy).await?);
        }
        ShellCommand::Lock => {
            credentials.session().lock().await;
            output::info("Vault locked.");
        }
        ShellCommand::Unlock => {
            if credentials.session().is_unlocked() {
                output::info("Already unlocked.");
            } else {
                unlock(credentials).await?;
            }
        }
        ShellCommand::Login { username } => {
            let password = prompt_account_password(&username)?;
            if accounts.login(&username, &password).await? {
                output::success(&format!("Logged in as {username}"));
            } else {
                return Err(PassKeeperError::InvalidCredentials);
            }
        }
        ShellCommand::Logout => {
            accounts.logout().await;
            output::info("Logged out.");
        }
        ShellCommand::WhoAmI => match accounts.current_user() {
            Some(user) => output::info(&user),
            None => output::info("Not logged in."),
        },
    }
    if credentials.is_stale() {
        output::warning("Saved, but the entry list could not be reloaded. Run `list` to refresh.");
    }
    Ok(())
}

/// Read entry fields from the terminal, offering `base` values as defaults.
///
/// An empty password keeps the base password, or asks for generation
/// when there is no base.
fn read_draft(base: Option<&EntryDraft>) -> Result<EntryDraft> {
    let text = |prompt: &str, initial: Option<&str>| -> Result<String> {
        let mut input = Input::<String>::new().with_prompt(prompt).allow_empty(true);
        if let Some(initial) = initial {
            input = input.with_initial_text(initial);
        }
        input
            .interact_text()
            .map_err(|e| PassKeeperError::CommandFailed(format!("input: {e}")))
    };

    let title = text("Title", base.map(|b| b.title.as_str()))?;
    let username = text("Username", base.map(|b| b.username.as_str()))?;
    let password = Zeroizing::new(
        Password::new()
            .with_prompt("Password (empty to keep or generate)")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| PassKeeperError::CommandFailed(format!("password prompt: {e}")))?,
    );
    let url = text("Url", base.and_then(|b| b.url.as_deref()))?;
    let notes = text("Notes", base.and_then(|b| b.notes.as_deref()))?;

    let password = match (password.is_empty(), base) {
        (true, Some(b)) => b.password.clone(),
        _ => password.to_string(),
    };

    Ok(EntryDraft::new(title, username, password)
        .with_url(Some(url))
        .with_notes(Some(notes)))
}

async fn fill_generated(
    ctx: &AppContext,
    client: &CredentialClient,
    mut draft: EntryDraft,
) -> Result<EntryDraft> {
    if draft.password.is_empty() {
        draft.password = client
            .generate_with_policy(ctx.settings.generator_policy())
            .await?;
        output::info("Generated a password for this entry.");
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(parse_line("list").unwrap(), ShellCommand::List);
        assert_eq!(
            parse_line("  show abc-123 ").unwrap(),
            ShellCommand::Get {
                id: "abc-123".into(),
                reveal: true
            }
        );
        assert_eq!(
            parse_line("search git hub").unwrap(),
            ShellCommand::Search {
                query: "git hub".into()
            }
        );
        assert_eq!(
            parse_line("gen 24").unwrap(),
            ShellCommand::Generate { length: Some(24) }
        );
        assert_eq!(parse_line("").unwrap(), ShellCommand::Empty);
        assert_eq!(parse_line("EXIT").unwrap(), ShellCommand::Quit);
    }

    #[test]
    fn rejects_missing_arguments_and_unknown_words() {
        assert!(parse_line("get").is_err());
        assert!(parse_line("delete").is_err());
        assert!(parse_line("generate many").is_err());
        assert!(parse_line("frobnicate").is_err());
    }
}
