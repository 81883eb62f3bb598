//! Integration tests for the PassKeeper CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`.
//! Passwords come from environment variables so nothing prompts, and every
//! test writes a `passkeeper.toml` with cheap Argon2 settings into its own
//! data directory.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const MASTER: &str = "correct-horse-battery";

/// Helper: get a Command pointing at the passkeeper binary.
fn passkeeper() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("passkeeper").expect("binary should exist");
    cmd.env_remove("PASSKEEPER_PASSWORD")
        .env_remove("PASSKEEPER_ACCOUNT_PASSWORD")
        .env_remove("PASSKEEPER_DATA_DIR")
        .env_remove("PASSKEEPER_LOG");
    cmd
}

/// A data directory with fast key derivation settings.
fn data_dir() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child("passkeeper.toml")
        .write_str("argon2_memory_kib = 8192\nargon2_iterations = 1\nargon2_parallelism = 1\n")
        .unwrap();
    tmp
}

/// Helper: a command bound to `dir` with the master password set.
fn in_vault(dir: &TempDir) -> Command {
    let mut cmd = passkeeper();
    cmd.arg("--data-dir")
        .arg(dir.path())
        .env("PASSKEEPER_PASSWORD", MASTER);
    cmd
}

#[test]
fn help_flag_shows_usage() {
    passkeeper()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted password manager"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("delete"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("account"));
}

#[test]
fn version_flag_shows_version() {
    passkeeper()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("passkeeper"));
}

#[test]
fn no_args_shows_help() {
    passkeeper()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn generate_prints_requested_passwords() {
    let dir = data_dir();
    let output = passkeeper()
        .args(["generate", "--length", "24", "--no-symbols", "-n", "3"])
        .arg("--data-dir")
        .arg(dir.path())
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    for line in lines {
        assert_eq!(line.len(), 24);
        assert!(line.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}

#[test]
fn generate_rejects_out_of_range_length() {
    let dir = data_dir();
    passkeeper()
        .args(["generate", "--length", "0"])
        .arg("--data-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid password length"));
}

#[test]
fn get_on_missing_vault_fails() {
    let dir = data_dir();
    in_vault(&dir)
        .args(["get", "some-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn init_add_list_round_trip() {
    let dir = data_dir();

    in_vault(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));
    dir.child("passwords.vault").assert(predicate::path::exists());

    in_vault(&dir)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    in_vault(&dir)
        .args(["add", "--title", "GitHub", "--username", "alice", "--generate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added entry"));

    in_vault(&dir)
        .args(["add", "--title", "github", "--username", "alice", "--generate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Duplicate entry"));

    in_vault(&dir)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("alice"));

    in_vault(&dir)
        .args(["search", "git"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GitHub"));
}

#[test]
fn wrong_master_password_is_rejected() {
    let dir = data_dir();
    in_vault(&dir).arg("init").assert().success();

    passkeeper()
        .arg("--data-dir")
        .arg(dir.path())
        .env("PASSKEEPER_PASSWORD", "not-the-password")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid credentials"));
}

#[test]
fn init_enforces_minimum_password_length() {
    let dir = data_dir();
    passkeeper()
        .arg("--data-dir")
        .arg(dir.path())
        .env("PASSKEEPER_PASSWORD", "short")
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least 8"));
    dir.child("passwords.vault")
        .assert(predicate::path::missing());
}

#[test]
fn account_create_store_and_list_services() {
    let dir = data_dir();
    let account = |args: &[&str]| {
        let mut cmd = passkeeper();
        cmd.arg("--data-dir")
            .arg(dir.path())
            .env("PASSKEEPER_ACCOUNT_PASSWORD", "s3cret-pw")
            .arg("account")
            .args(args);
        cmd
    };

    account(&["create", "alice"]).assert().success();
    account(&["create", "alice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    account(&["store", "alice", "mail", "alice@example.com", "--password", "pw1"])
        .assert()
        .success();
    account(&["services", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mail"))
        .stdout(predicate::str::contains("alice@example.com"))
        .stdout(predicate::str::contains("pw1").not());

    account(&["remove", "alice", "bank", "0042"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn bad_config_is_reported() {
    let tmp = TempDir::new().unwrap();
    tmp.child("passkeeper.toml")
        .write_str("backend_timeout_secs = 0\n")
        .unwrap();
    passkeeper()
        .arg("--data-dir")
        .arg(tmp.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("backend_timeout_secs"));
}

#[test]
fn completions_need_no_data_dir() {
    passkeeper()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("passkeeper"));
}
