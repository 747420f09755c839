//! CLI module — Clap argument parser, prompts, the command loop and output
//! helpers.

pub mod commands;
pub mod output;
pub mod prompt;
pub mod repl;

use std::path::{Path, PathBuf};

use clap::Parser;

use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{AcctMgrError, Result};

/// Minimum master password length for new vaults.
const MIN_PASSWORD_LEN: usize = 8;

/// File name used when the vault location comes from an environment variable.
const VAULT_FILE_NAME: &str = "vault.dat";

/// acctmgr: encrypted local account manager.
#[derive(Parser, Debug)]
#[command(
    name = "acctmgr",
    about = "Encrypted local account and password manager",
    version
)]
pub struct Cli {
    /// Path to the vault file (default: $ACCTMGR_VAULT/vault.dat,
    /// $ACCTMGR_DIR/vault.dat, or the configured vault_dir)
    pub vault: Option<PathBuf>,

    /// Seconds before copied values are cleared from the clipboard (0 = never)
    #[arg(long, value_name = "SECS")]
    pub clipboard_timeout: Option<u64>,

    /// Seconds of inactivity before the vault locks (0 = never)
    #[arg(long, value_name = "SECS")]
    pub idle_timeout: Option<u64>,
}

impl Cli {
    /// Apply command-line overrides on top of file settings.
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(secs) = self.clipboard_timeout {
            settings.clipboard_clear_secs = secs;
        }
        if let Some(secs) = self.idle_timeout {
            settings.idle_timeout_secs = secs;
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Work out which vault file to use, trying in order:
/// 1. the positional argument
/// 2. `$ACCTMGR_VAULT/vault.dat`
/// 3. `$ACCTMGR_DIR/vault.dat`
/// 4. `vault_dir`/`vault_file` from settings, relative to `cwd`
pub fn vault_path(cli: &Cli, settings: &Settings, cwd: &Path) -> PathBuf {
    resolve_vault_path(
        cli.vault.as_deref(),
        env_dir("ACCTMGR_VAULT").or_else(|| env_dir("ACCTMGR_DIR")),
        settings,
        cwd,
    )
}

fn env_dir(name: &str) -> Option<PathBuf> {
    std::env::var_os(name)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn resolve_vault_path(
    explicit: Option<&Path>,
    env_dir: Option<PathBuf>,
    settings: &Settings,
    cwd: &Path,
) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Some(dir) = env_dir {
        return dir.join(VAULT_FILE_NAME);
    }
    settings.vault_path(cwd)
}

/// Get the master password, trying in order:
/// 1. `ACCTMGR_PASSWORD` env var (scripted use)
/// 2. Interactive hidden prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| AcctMgrError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// Also respects `ACCTMGR_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Some(pw) = password_from_env() {
        check_new_password(&pw)?;
        return Ok(pw);
    }

    loop {
        let password = Zeroizing::new(
            dialoguer::Password::new()
                .with_prompt("Set master password")
                .with_confirmation("Confirm password", "Passwords don't match, try again")
                .interact()
                .map_err(|e| AcctMgrError::CommandFailed(format!("password prompt: {e}")))?,
        );

        if let Err(e) = check_new_password(&password) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(password);
    }
}

fn password_from_env() -> Option<Zeroizing<String>> {
    std::env::var("ACCTMGR_PASSWORD")
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Zeroizing::new)
}

fn check_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AcctMgrError::CommandFailed(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins() {
        let path = resolve_vault_path(
            Some(Path::new("/tmp/mine.dat")),
            Some(PathBuf::from("/env/dir")),
            &Settings::default(),
            Path::new("/cwd"),
        );
        assert_eq!(path, PathBuf::from("/tmp/mine.dat"));
    }

    #[test]
    fn env_dir_beats_settings() {
        let path = resolve_vault_path(
            None,
            Some(PathBuf::from("/env/dir")),
            &Settings::default(),
            Path::new("/cwd"),
        );
        assert_eq!(path, PathBuf::from("/env/dir/vault.dat"));
    }

    #[test]
    fn falls_back_to_settings() {
        let settings = Settings {
            vault_dir: "data".into(),
            ..Settings::default()
        };
        let path = resolve_vault_path(None, None, &settings, Path::new("/cwd"));
        assert_eq!(path, PathBuf::from("/cwd/data/vault.dat"));
    }

    #[test]
    fn new_password_length_is_checked() {
        assert!(check_new_password("short").is_err());
        assert!(check_new_password("long enough").is_ok());
    }

    #[test]
    fn overrides_replace_settings() {
        let cli = Cli::parse_from(["acctmgr", "--clipboard-timeout", "5", "--idle-timeout", "0"]);
        let mut settings = Settings::default();
        cli.apply_overrides(&mut settings);
        assert_eq!(settings.clipboard_clear_secs, 5);
        assert_eq!(settings.idle_timeout_secs, 0);
        assert!(cli.vault.is_none());
    }

    #[test]
    fn positional_vault_path() {
        let cli = Cli::parse_from(["acctmgr", "/tmp/v.dat"]);
        assert_eq!(cli.vault, Some(PathBuf::from("/tmp/v.dat")));
    }
}
