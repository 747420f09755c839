//! AES-256-GCM authenticated encryption.
//!
//! Unlike a self-describing blob, the vault stores its nonce in the
//! container header, so `seal` and `open` take the nonce explicitly and
//! authenticate the header bytes as associated data.
//!
//! Output of `seal`:
//!   [ ciphertext | 16-byte auth tag ]

use aes_gcm::aead::{Aead, KeyInit, OsRng, Payload};
use aes_gcm::{AeadCore, Aes256Gcm, Nonce};
use zeroize::Zeroizing;

use super::keys::{SecretBytes, VaultKey};
use crate::errors::{AcctMgrError, Result};

/// Size of the AES-256-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Generate a random 12-byte nonce. Called once per save.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
    let mut out = [0u8; NONCE_LEN];
    out.copy_from_slice(&nonce);
    out
}

/// Encrypt and authenticate `plaintext`, binding `aad` into the tag.
pub fn seal(
    key: &VaultKey,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| AcctMgrError::EncryptionFailed(format!("invalid key length: {e}")))?;

    cipher
        .encrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|e| AcctMgrError::EncryptionFailed(format!("encryption error: {e}")))
}

/// Verify and decrypt data produced by `seal`.
///
/// A wrong key, a flipped bit anywhere in `ciphertext`, or a changed
/// `aad`/`nonce` all yield the same `DecryptionFailed`.
pub fn open(
    key: &VaultKey,
    nonce: &[u8; NONCE_LEN],
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<SecretBytes> {
    if ciphertext.len() < TAG_LEN {
        return Err(AcctMgrError::DecryptionFailed);
    }

    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| AcctMgrError::DecryptionFailed)?;

    let plaintext = cipher
        .decrypt(
            Nonce::from_slice(nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| AcctMgrError::DecryptionFailed)?;

    Ok(Zeroizing::new(plaintext))
}
