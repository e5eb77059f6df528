use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{OpVaultError, Result};

/// Project-level configuration, loaded from `.opvault.toml`.
///
/// Every field has a sensible default so OpVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file path (relative to the project root).
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// PBKDF2 iteration count for newly created profiles.
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Generated password length.
    #[serde(default = "default_password_length")]
    pub password_length: usize,

    /// Digits in a generated password.
    #[serde(default = "default_password_digits")]
    pub password_digits: usize,

    /// Symbols in a generated password.
    #[serde(default = "default_password_symbols")]
    pub password_symbols: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_file() -> String {
    "vault.opvault".to_string()
}

fn default_pbkdf2_iterations() -> u32 {
    100_000
}

fn default_password_length() -> usize {
    20
}

fn default_password_digits() -> usize {
    3
}

fn default_password_symbols() -> usize {
    2
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_file: default_vault_file(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            password_length: default_password_length(),
            password_digits: default_password_digits(),
            password_symbols: default_password_symbols(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".opvault.toml";

    /// Load settings from `<project_dir>/.opvault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            OpVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        if settings.pbkdf2_iterations < 1 {
            return Err(OpVaultError::ConfigError(
                "pbkdf2_iterations must be at least 1".into(),
            ));
        }

        Ok(settings)
    }

    /// Full path to the vault file.
    ///
    /// Example: `project_dir/vault.opvault`
    pub fn vault_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.vault_file)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
