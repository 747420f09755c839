//! Integration tests for the acctmgr crypto module.

use acctmgr::crypto::generate::{clamp_length, MAX_GENERATED_LEN, MIN_GENERATED_LEN};
use acctmgr::crypto::{
    derive_key, generate_nonce, generate_password, generate_salt, open, seal, KdfParams,
    VaultKey, NONCE_LEN, SALT_LEN, TAG_LEN,
};
use acctmgr::errors::AcctMgrError;

// ---------------------------------------------------------------------------
// Sealing and opening
// ---------------------------------------------------------------------------

#[test]
fn seal_open_roundtrip_with_associated_data() {
    let key = VaultKey::from_bytes([0xABu8; 32]);
    let nonce = generate_nonce();
    let aad = b"ACCT header bytes";
    let plaintext = b"github / octocat / hunter2";

    let ciphertext = seal(&key, &nonce, aad, plaintext).expect("seal should succeed");
    assert_eq!(ciphertext.len(), plaintext.len() + TAG_LEN);

    let recovered = open(&key, &nonce, aad, &ciphertext).expect("open should succeed");
    assert_eq!(recovered.as_slice(), plaintext);
}

#[test]
fn open_with_wrong_key_fails() {
    let key = VaultKey::from_bytes([0x11u8; 32]);
    let wrong_key = VaultKey::from_bytes([0x22u8; 32]);
    let nonce = generate_nonce();

    let ciphertext = seal(&key, &nonce, b"", b"TOP_SECRET").expect("seal");
    assert!(matches!(
        open(&wrong_key, &nonce, b"", &ciphertext),
        Err(AcctMgrError::DecryptionFailed)
    ));
}

#[test]
fn open_with_changed_associated_data_fails() {
    let key = VaultKey::from_bytes([0x33u8; 32]);
    let nonce = generate_nonce();

    let ciphertext = seal(&key, &nonce, b"count=1", b"record").expect("seal");
    assert!(matches!(
        open(&key, &nonce, b"count=2", &ciphertext),
        Err(AcctMgrError::DecryptionFailed)
    ));
}

#[test]
fn open_with_truncated_data_fails() {
    let key = VaultKey::from_bytes([0xAAu8; 32]);
    let nonce = [0u8; NONCE_LEN];
    assert!(matches!(
        open(&key, &nonce, b"", &[0u8; TAG_LEN - 1]),
        Err(AcctMgrError::DecryptionFailed)
    ));
}

#[test]
fn empty_plaintext_still_has_a_tag() {
    let key = VaultKey::from_bytes([0x44u8; 32]);
    let nonce = generate_nonce();
    let ciphertext = seal(&key, &nonce, b"header", b"").expect("seal");
    assert_eq!(ciphertext.len(), TAG_LEN);
    assert!(open(&key, &nonce, b"header", &ciphertext)
        .expect("open")
        .is_empty());
}

#[test]
fn nonces_are_random() {
    assert_ne!(generate_nonce(), generate_nonce());
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derivation_is_deterministic() {
    let salt = [7u8; SALT_LEN];
    let params = KdfParams::minimum();
    let a = derive_key(b"hunter2", &salt, &params).unwrap();
    let b = derive_key(b"hunter2", &salt, &params).unwrap();
    assert_eq!(a.as_bytes(), b.as_bytes());
}

#[test]
fn different_salt_or_password_gives_different_key() {
    let params = KdfParams::minimum();
    let base = derive_key(b"hunter2", &[1u8; SALT_LEN], &params).unwrap();
    let other_salt = derive_key(b"hunter2", &[2u8; SALT_LEN], &params).unwrap();
    let other_pw = derive_key(b"hunter3", &[1u8; SALT_LEN], &params).unwrap();
    assert_ne!(base.as_bytes(), other_salt.as_bytes());
    assert_ne!(base.as_bytes(), other_pw.as_bytes());
}

#[test]
fn too_weak_parameters_are_rejected() {
    let weak = KdfParams {
        memory_kib: 1024,
        ..KdfParams::minimum()
    };
    assert!(matches!(
        derive_key(b"pw", &generate_salt(), &weak),
        Err(AcctMgrError::KeyDerivationFailed(_))
    ));
}

#[test]
fn salts_are_random() {
    assert_ne!(generate_salt(), generate_salt());
}

// ---------------------------------------------------------------------------
// Password generation
// ---------------------------------------------------------------------------

#[test]
fn generated_passwords_have_requested_length_and_differ() {
    let a = generate_password(24);
    let b = generate_password(24);
    assert_eq!(a.len(), 24);
    assert_ne!(a.as_str(), b.as_str());
    assert!(a.chars().all(|c| c.is_ascii_graphic()));
}

#[test]
fn generator_lengths_are_clamped() {
    assert_eq!(clamp_length(1), MIN_GENERATED_LEN);
    assert_eq!(clamp_length(1000), MAX_GENERATED_LEN);
    assert_eq!(clamp_length(16), 16);
}
