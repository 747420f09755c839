//! Random password generation.

use rand::Rng;
use zeroize::Zeroizing;

/// Characters a generated password is drawn from.
const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz\
ABCDEFGHIJKLMNOPQRSTUVWXYZ\
0123456789\
!@#$%^&*()-_=+[]{}|;:,.<>?";

/// Length used when a record's password is generated with `g`.
pub const ENTRY_PASSWORD_LEN: usize = 24;

/// Shortest and longest lengths accepted by the `gen` command.
pub const MIN_GENERATED_LEN: usize = 8;
pub const MAX_GENERATED_LEN: usize = 64;

/// Generate a password of `len` characters, each picked uniformly from
/// `CHARSET` with the thread-local CSPRNG.
pub fn generate_password(len: usize) -> Zeroizing<String> {
    let mut rng = rand::rng();
    let mut out = Zeroizing::new(String::with_capacity(len));
    for _ in 0..len {
        let idx = rng.random_range(0..CHARSET.len());
        out.push(char::from(CHARSET[idx]));
    }
    out
}

/// Clamp a requested length to `MIN_GENERATED_LEN..=MAX_GENERATED_LEN`.
pub fn clamp_length(requested: usize) -> usize {
    requested.clamp(MIN_GENERATED_LEN, MAX_GENERATED_LEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_password_has_requested_length() {
        assert_eq!(generate_password(24).len(), 24);
        assert_eq!(generate_password(0).len(), 0);
    }

    #[test]
    fn generated_password_uses_charset_only() {
        let pw = generate_password(256);
        assert!(pw.bytes().all(|b| CHARSET.contains(&b)));
    }

    #[test]
    fn two_passwords_differ() {
        assert_ne!(*generate_password(32), *generate_password(32));
    }

    #[test]
    fn clamp_length_bounds() {
        assert_eq!(clamp_length(2), 8);
        assert_eq!(clamp_length(20), 20);
        assert_eq!(clamp_length(500), 64);
    }
}
