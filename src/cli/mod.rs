//! CLI module: Clap argument parser, prompts, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use zeroize::Zeroizing;

use crate::backend::{Backend, LocalBackend};
use crate::client::CredentialClient;
use crate::config::{resolve_data_dir, Settings};
use crate::errors::{PassKeeperError, Result};
use crate::session::VaultSession;

/// Environment variable read for the master password before prompting.
pub const PASSWORD_ENV: &str = "PASSKEEPER_PASSWORD";

/// Environment variable read for an account password before prompting.
pub const ACCOUNT_PASSWORD_ENV: &str = "PASSKEEPER_ACCOUNT_PASSWORD";

/// PassKeeper CLI: local encrypted password manager.
#[derive(Parser)]
#[command(
    name = "passkeeper",
    about = "Local encrypted password manager",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (default: the platform data directory)
    #[arg(long, env = "PASSKEEPER_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the credential vault with a new master password
    Init,

    /// List all entries
    List,

    /// Show one entry
    Get {
        /// Entry id (as printed by `list`)
        id: String,
        /// Print the password instead of masking it
        #[arg(long)]
        show: bool,
        /// Copy the password to the clipboard
        #[arg(short, long)]
        copy: bool,
    },

    /// Add an entry
    Add {
        /// Service or site name
        #[arg(short, long)]
        title: String,
        /// Account name on that service
        #[arg(short, long)]
        username: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Generate the password instead of prompting for it
        #[arg(short, long)]
        generate: bool,
        /// Length of the generated password
        #[arg(short, long)]
        length: Option<usize>,
    },

    /// Edit an entry; omitted fields keep their current value
    Edit {
        /// Entry id
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Prompt for a new password
        #[arg(short, long)]
        password: bool,
        /// Replace the password with a generated one
        #[arg(short, long, conflicts_with = "password")]
        generate: bool,
    },

    /// Delete an entry
    Delete {
        /// Entry id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Find entries by title, username or url
    Search {
        query: String,
    },

    /// Generate a random password
    Generate {
        /// Password length (default from config: 16)
        #[arg(short, long)]
        length: Option<usize>,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_numbers: bool,
        #[arg(long)]
        no_symbols: bool,
        /// How many passwords to print
        #[arg(short = 'n', long, default_value = "1")]
        count: usize,
    },

    /// Manage accounts and their service records
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Interactive session (unlock once, run many commands)
    Shell,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },

    /// Show version
    Version,
}

/// Account subcommands. Every command but `create` logs in first.
#[derive(clap::Subcommand)]
pub enum AccountAction {
    /// Create a new account
    Create { username: String },

    /// List the service records of an account
    Services { username: String },

    /// Store a new service record
    Store {
        username: String,
        service: String,
        account: String,
        /// Record password (prompted if omitted)
        #[arg(long, env = "PASSKEEPER_SERVICE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Remove a service record
    Remove {
        username: String,
        service: String,
        account: String,
    },

    /// Change the password of a service record
    Modify {
        username: String,
        service: String,
        account: String,
        #[arg(long, env = "PASSKEEPER_SERVICE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved data directory, settings, and the backend built from them.
pub struct AppContext {
    pub data_dir: PathBuf,
    pub settings: Settings,
    pub backend: Arc<LocalBackend>,
}

impl AppContext {
    pub fn load(cli: &Cli) -> Result<Self> {
        let data_dir = resolve_data_dir(cli.data_dir.clone())?;
        let settings = Settings::load(&data_dir)?;
        let backend = Arc::new(LocalBackend::from_settings(&data_dir, &settings));
        Ok(Self {
            data_dir,
            settings,
            backend,
        })
    }

    fn dyn_backend(&self) -> Arc<dyn Backend> {
        self.backend.clone()
    }

    /// Start a session against this context's backend.
    pub async fn session(&self) -> Arc<VaultSession> {
        Arc::new(VaultSession::start(self.dyn_backend(), self.settings.backend_timeout()).await)
    }

    /// Start a session and unlock it with the master password.
    pub async fn unlocked_client(&self) -> Result<CredentialClient> {
        if !self.backend.vault_exists() {
            output::tip("Run `passkeeper init` to create a vault first.");
            return Err(PassKeeperError::StoreMissing(
                self.backend.vault_path().display().to_string(),
            ));
        }

        let session = self.session().await;
        if !session.is_unlocked() {
            let password = prompt_password()?;
            session.authorize(&password).await?;
        }
        Ok(CredentialClient::new(session))
    }
}

/// Get the master password, trying in order:
/// 1. `PASSKEEPER_PASSWORD` env var (scripting)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = non_empty_env(PASSWORD_ENV) {
        return Ok(pw);
    }
    prompt_secret("Master password")
}

/// Prompt for a new master password with confirmation (used by `init`).
///
/// Also respects `PASSKEEPER_PASSWORD`. Enforces `min_len`.
pub fn prompt_new_password(min_len: usize) -> Result<Zeroizing<String>> {
    if let Some(pw) = non_empty_env(PASSWORD_ENV) {
        if pw.chars().count() < min_len {
            return Err(PassKeeperError::PasswordTooShort(min_len));
        }
        return Ok(pw);
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| PassKeeperError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < min_len {
            output::warning(&format!(
                "Password must be at least {min_len} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Get an account password from `PASSKEEPER_ACCOUNT_PASSWORD` or a prompt.
pub fn prompt_account_password(username: &str) -> Result<Zeroizing<String>> {
    if let Some(pw) = non_empty_env(ACCOUNT_PASSWORD_ENV) {
        return Ok(pw);
    }
    prompt_secret(&format!("Password for {username}"))
}

/// Hidden single-line prompt.
pub fn prompt_secret(prompt: &str) -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| PassKeeperError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Yes/no confirmation, defaulting to no.
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| PassKeeperError::CommandFailed(format!("confirm prompt: {e}")))
}

fn non_empty_env(var: &str) -> Option<Zeroizing<String>> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(Zeroizing::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_add_with_generate() {
        let cli = Cli::try_parse_from([
            "passkeeper",
            "add",
            "--title",
            "Bank",
            "--username",
            "alice",
            "--generate",
            "--length",
            "20",
        ])
        .unwrap();
        match cli.command {
            Commands::Add {
                title,
                username,
                generate,
                length,
                ..
            } => {
                assert_eq!(title, "Bank");
                assert_eq!(username, "alice");
                assert!(generate);
                assert_eq!(length, Some(20));
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn edit_rejects_password_and_generate_together() {
        let parsed = Cli::try_parse_from(["passkeeper", "edit", "abc", "--password", "--generate"]);
        assert!(parsed.is_err());
    }
}
