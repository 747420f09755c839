//! Password-based key derivation using Argon2id.
//!
//! Argon2id is a memory-hard KDF; the default cost is chosen so that one
//! derivation takes a noticeable fraction of a second to a few seconds on
//! a desktop machine. That delay is the brute-force deterrent.

use std::time::Instant;

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use super::keys::{VaultKey, KEY_LEN};
use crate::errors::{AcctMgrError, Result};

/// Length of the Argon2 salt stored in the vault header (128 bits).
pub const SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Argon2id cost parameters.
///
/// These are not stored in the vault header, so every derivation for a
/// given vault must use the same values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB (default: 262 144 = 256 MB).
    pub memory_kib: u32,
    /// Number of passes (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 1).
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            memory_kib: 262_144,
            iterations: 3,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// The cheapest parameters `derive_key` accepts. Meant for tests.
    pub const fn minimum() -> Self {
        Self {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(AcctMgrError::KeyDerivationFailed(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(AcctMgrError::KeyDerivationFailed(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(AcctMgrError::KeyDerivationFailed(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Derive the 32-byte vault key from a password and the vault's salt.
///
/// The output is written straight into a pinned `VaultKey`; on any error
/// that buffer is dropped (and zeroed) before returning, so no partial key
/// ever reaches the caller.
pub fn derive_key(password: &[u8], salt: &[u8; SALT_LEN], params: &KdfParams) -> Result<VaultKey> {
    params.validate()?;

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        Some(KEY_LEN),
    )
    .map_err(|e| AcctMgrError::KeyDerivationFailed(format!("invalid Argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let started = Instant::now();
    let mut key = VaultKey::zeroed();
    argon2
        .hash_password_into(password, salt, key.as_mut_bytes())
        .map_err(|e| AcctMgrError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}")))?;

    tracing::debug!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        memory_kib = params.memory_kib,
        iterations = params.iterations,
        "derived vault key"
    );

    Ok(key)
}

/// Generate a random salt. Only called when a vault is created.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
