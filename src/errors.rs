use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in acctmgr.
#[derive(Debug, Error)]
pub enum AcctMgrError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Deliberately the same for a wrong password and a tampered file.
    #[error("Decryption failed — wrong password or corrupted vault")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Format errors ---
    #[error("Invalid vault format: {0}")]
    InvalidVaultFormat(String),

    // --- Store errors ---
    #[error("Capacity exceeded: {requested} entries requested, the vault holds at most {capacity}")]
    CapacityExceeded { requested: usize, capacity: usize },

    #[error("Entry {index} does not exist (vault has {count} entries)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("{field} is {len} bytes long, the limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Entry name cannot be empty")]
    EmptyName,

    // --- Session errors ---
    #[error("Vault is locked")]
    VaultLocked,

    #[error("Vault not found at {0}")]
    VaultNotFound(PathBuf),

    #[error("Vault already exists at {0}")]
    VaultAlreadyExists(PathBuf),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Clipboard error: {0}")]
    ClipboardError(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for acctmgr results.
pub type Result<T> = std::result::Result<T, AcctMgrError>;
