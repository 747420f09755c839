//! In-memory handling of the vault key and plaintext scratch buffers.
//!
//! `VaultKey` owns the derived 32-byte key for the whole Unlocked lifetime
//! of a session. The bytes live in their own heap allocation so their
//! address never changes, the pages are pinned with `mlock`, and the key is
//! zeroed and unpinned when the value is dropped, whatever the exit path.

use std::fmt;

use zeroize::{Zeroize, Zeroizing};

use super::memlock;

/// Length of the vault key (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Plaintext scratch space that is wiped when it goes out of scope.
pub type SecretBytes = Zeroizing<Vec<u8>>;

/// Allocate a zero-filled scratch buffer with room for exactly `len` bytes.
///
/// Sizing it up front means pushing up to `len` bytes never reallocates,
/// so no stray copies of plaintext are left behind in freed memory.
pub fn scratch(len: usize) -> SecretBytes {
    Zeroizing::new(Vec::with_capacity(len))
}

/// The derived vault key. Zeroed and unpinned on drop.
pub struct VaultKey {
    bytes: Box<[u8; KEY_LEN]>,
    pinned: bool,
}

impl VaultKey {
    /// Allocate an all-zero key and pin its page.
    ///
    /// Failure to pin is not fatal; it is reported at warn level.
    pub fn zeroed() -> Self {
        let bytes = Box::new([0u8; KEY_LEN]);
        let pinned = match memlock::lock(bytes.as_slice()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "could not pin key memory; it may be swapped to disk");
                false
            }
        };
        Self { bytes, pinned }
    }

    /// Build a key from raw bytes, wiping the caller's copy.
    pub fn from_bytes(mut raw: [u8; KEY_LEN]) -> Self {
        let mut key = Self::zeroed();
        key.bytes.copy_from_slice(&raw);
        raw.zeroize();
        key
    }

    /// Access the raw key bytes (e.g. to build a cipher).
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    /// Mutable access for writing a freshly derived key in place.
    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; KEY_LEN] {
        &mut self.bytes
    }

    /// Whether the key's memory is pinned against swapping.
    pub fn is_pinned(&self) -> bool {
        self.pinned
    }
}

impl Drop for VaultKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
        if self.pinned {
            if let Err(e) = memlock::unlock(self.bytes.as_slice()) {
                tracing::debug!(error = %e, "munlock of key memory failed");
            }
        }
    }
}

impl fmt::Debug for VaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VaultKey")
            .field("bytes", &"[redacted]")
            .field("pinned", &self.pinned)
            .finish()
    }
}
