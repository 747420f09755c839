//! Cryptographic primitives for acctmgr.
//!
//! This module provides:
//! - Argon2id password-based key derivation (`kdf`)
//! - AES-256-GCM sealing and opening with associated data (`encryption`)
//! - The pinned, zero-on-drop vault key and scratch buffers (`keys`)
//! - `mlock` and core dump helpers (`memlock`)
//! - Random password generation (`generate`)

pub mod encryption;
pub mod generate;
pub mod kdf;
pub mod keys;
pub mod memlock;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{seal, open, derive_key, ...};
pub use encryption::{generate_nonce, open, seal, NONCE_LEN, TAG_LEN};
pub use generate::generate_password;
pub use kdf::{derive_key, generate_salt, KdfParams, SALT_LEN};
pub use keys::{SecretBytes, VaultKey, KEY_LEN};
