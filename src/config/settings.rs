use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::crypto::kdf::Argon2Params;
use crate::errors::{PassKeeperError, Result};
use crate::generator::GeneratorPolicy;

/// Application configuration, loaded from `<data_dir>/passkeeper.toml`.
///
/// Every field has a sensible default so PassKeeper works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File name (relative to the data directory) of the credential vault.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// Directory (relative to the data directory) holding account records.
    #[serde(default = "default_accounts_dir")]
    pub accounts_dir: String,

    /// How long to wait for a single backend command before giving up.
    #[serde(default = "default_backend_timeout_secs")]
    pub backend_timeout_secs: u64,

    /// Minimum length of a new master password.
    #[serde(default = "default_min_master_password_len")]
    pub min_master_password_len: usize,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    #[serde(default = "default_generator_length")]
    pub generator_length: usize,

    #[serde(default = "default_true")]
    pub generator_uppercase: bool,

    #[serde(default = "default_true")]
    pub generator_numbers: bool,

    #[serde(default = "default_true")]
    pub generator_symbols: bool,

    /// Log filter used when `PASSKEEPER_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    "passwords.vault".to_string()
}

fn default_accounts_dir() -> String {
    "accounts".to_string()
}

fn default_backend_timeout_secs() -> u64 {
    30
}

fn default_min_master_password_len() -> usize {
    8
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_generator_length() -> usize {
    16
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            accounts_dir: default_accounts_dir(),
            backend_timeout_secs: default_backend_timeout_secs(),
            min_master_password_len: default_min_master_password_len(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            generator_length: default_generator_length(),
            generator_uppercase: true,
            generator_numbers: true,
            generator_symbols: true,
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the data directory.
    pub const FILE_NAME: &'static str = "passkeeper.toml";

    /// Load settings from `<data_dir>/passkeeper.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = data_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PassKeeperError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.backend_timeout_secs == 0 {
            return Err(PassKeeperError::ConfigError(
                "backend_timeout_secs must be at least 1".into(),
            ));
        }
        settings
            .argon2_params()
            .validate()
            .map_err(|e| PassKeeperError::ConfigError(e.to_string()))?;

        Ok(settings)
    }

    /// Example: `data_dir/passwords.vault`
    pub fn vault_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.vault_file)
    }

    /// Example: `data_dir/accounts`
    pub fn accounts_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.accounts_dir)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// The generator policy used when no flags override it.
    pub fn generator_policy(&self) -> GeneratorPolicy {
        GeneratorPolicy::new(
            self.generator_length,
            self.generator_uppercase,
            self.generator_numbers,
            self.generator_symbols,
        )
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault_file, "passwords.vault");
        assert_eq!(s.accounts_dir, "accounts");
        assert_eq!(s.backend_timeout_secs, 30);
        assert_eq!(s.min_master_password_len, 8);
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.generator_policy(), GeneratorPolicy::new(16, true, true, true));
        assert_eq!(s.log_level, "warn");
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_file, "passwords.vault");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
vault_file = "mine.vault"
backend_timeout_secs = 5
argon2_memory_kib = 8192
argon2_iterations = 1
argon2_parallelism = 1
generator_length = 24
generator_symbols = false
log_level = "debug"
"#;
        fs::write(tmp.path().join(Settings::FILE_NAME), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.vault_path(tmp.path()), tmp.path().join("mine.vault"));
        assert_eq!(settings.backend_timeout(), Duration::from_secs(5));
        assert_eq!(settings.argon2_params().memory_kib, 8_192);
        assert_eq!(settings.generator_policy().length, 24);
        assert!(!settings.generator_policy().symbols);
        assert!(settings.generator_policy().uppercase);
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(Settings::FILE_NAME), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(PassKeeperError::ConfigError(_))));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(Settings::FILE_NAME),
            "backend_timeout_secs = 0\n",
        )
        .unwrap();
        assert!(Settings::load(tmp.path()).is_err());
    }

    #[test]
    fn weak_argon2_settings_are_a_config_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(Settings::FILE_NAME),
            "argon2_memory_kib = 1024\n",
        )
        .unwrap();
        let err = Settings::load(tmp.path()).unwrap_err();
        assert!(matches!(err, PassKeeperError::ConfigError(ref m) if m.contains("memory_kib")));
    }
}
