use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{AcctMgrError, Result};

/// Local configuration, loaded from `.acctmgr.toml`.
///
/// Every field has a sensible default so acctmgr works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Directory where the vault file lives.
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// Vault file name inside `vault_dir`.
    #[serde(default = "default_vault_file")]
    pub vault_file: String,

    /// Seconds before a copied value is cleared from the clipboard (0 = never).
    #[serde(default = "default_clipboard_clear_secs")]
    pub clipboard_clear_secs: u64,

    /// Seconds of inactivity before the vault locks itself (0 = never).
    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    /// Default length for `gen` without an argument.
    #[serde(default = "default_generated_password_len")]
    pub generated_password_len: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault_dir() -> String {
    ".".to_string()
}

fn default_vault_file() -> String {
    "vault.dat".to_string()
}

fn default_clipboard_clear_secs() -> u64 {
    30
}

fn default_idle_timeout_secs() -> u64 {
    300
}

fn default_generated_password_len() -> usize {
    20
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            vault_file: default_vault_file(),
            clipboard_clear_secs: default_clipboard_clear_secs(),
            idle_timeout_secs: default_idle_timeout_secs(),
            generated_password_len: default_generated_password_len(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for.
    const FILE_NAME: &'static str = ".acctmgr.toml";

    /// Load settings from `<dir>/.acctmgr.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(dir: &Path) -> Result<Self> {
        let config_path = dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            AcctMgrError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        tracing::debug!(path = %config_path.display(), "loaded settings");
        Ok(settings)
    }

    /// Full path to the vault file, relative to `base` unless `vault_dir`
    /// is absolute.
    pub fn vault_path(&self, base: &Path) -> PathBuf {
        base.join(&self.vault_dir).join(&self.vault_file)
    }

    pub fn clipboard_clear(&self) -> Duration {
        Duration::from_secs(self.clipboard_clear_secs)
    }

    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
