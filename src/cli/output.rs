//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::account::ServiceRecord;
use crate::vault::CredentialEntry;

const MASK: &str = "********";

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entries (Id, Title, Username, Url, Updated).
///
/// Passwords are never part of the table.
pub fn print_entries_table(entries: &[CredentialEntry]) {
    if entries.is_empty() {
        info("No entries in this vault yet.");
        tip("Run `passkeeper add --title <TITLE> --username <USER>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Title", "Username", "Url", "Updated"]);

    for e in entries {
        table.add_row(vec![
            e.id.clone(),
            e.title.clone(),
            e.username.clone(),
            e.url.clone().unwrap_or_default(),
            e.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print every field of one entry, masking the password unless `reveal`.
pub fn print_entry(entry: &CredentialEntry, reveal: bool) {
    let password = if reveal { entry.password.as_str() } else { MASK };
    println!("{:>10}  {}", style("Title").bold(), entry.title);
    println!("{:>10}  {}", style("Username").bold(), entry.username);
    println!("{:>10}  {}", style("Password").bold(), password);
    if let Some(url) = &entry.url {
        println!("{:>10}  {}", style("Url").bold(), url);
    }
    if let Some(notes) = &entry.notes {
        println!("{:>10}  {}", style("Notes").bold(), notes);
    }
    println!(
        "{:>10}  {}",
        style("Created").bold(),
        entry.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "{:>10}  {}",
        style("Updated").bold(),
        entry.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
    println!("{:>10}  {}", style("Id").dim(), style(&entry.id).dim());
}

/// Print a table of service records (Service, Account, Updated).
pub fn print_services_table(records: &[ServiceRecord]) {
    if records.is_empty() {
        info("No service records for this account yet.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Service", "Account", "Updated"]);

    for r in records {
        table.add_row(vec![
            r.service.clone(),
            r.account.clone(),
            r.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}
