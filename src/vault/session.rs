//! Locked/Unlocked lifecycle of a vault.
//!
//! A `Session` owns everything secret about an open vault: the derived key,
//! the salt and the decrypted records. It starts `Locked`. `create` and
//! `open` move it to `Unlocked`; `lock` (or dropping the session) wipes the
//! key and records and moves it back.
//!
//! ```text
//!            create / open
//!   Locked ─────────────────▶ Unlocked ──┐ add / update / remove
//!     ▲                           │  ◀────┘ (sets modified)
//!     └────────── lock ───────────┘  save: encode + atomic write
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use zeroize::Zeroize;

use super::format;
use super::record::{Field, Record, RecordFields};
use super::store::{CategoryGroup, EntryStore};
use crate::clipboard::ClipboardSink;
use crate::crypto::{derive_key, generate_salt, KdfParams, VaultKey, SALT_LEN};
use crate::errors::{AcctMgrError, Result};

/// Secrets held while a vault is open.
struct Unlocked {
    key: VaultKey,
    salt: [u8; SALT_LEN],
    entries: EntryStore,
    modified: bool,
}

impl Drop for Unlocked {
    fn drop(&mut self) {
        self.entries.wipe();
        self.salt.zeroize();
    }
}

enum State {
    Locked,
    Unlocked(Unlocked),
}

/// A vault file and, while unlocked, its decrypted contents.
pub struct Session {
    path: PathBuf,
    params: KdfParams,
    state: State,
}

impl Session {
    /// A locked session for the vault at `path` with default KDF costs.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_params(path, KdfParams::default())
    }

    pub fn with_params(path: impl Into<PathBuf>, params: KdfParams) -> Self {
        Self {
            path: path.into(),
            params,
            state: State::Locked,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_unlocked(&self) -> bool {
        matches!(self.state, State::Unlocked(_))
    }

    /// Whether there are changes not yet written to disk.
    pub fn is_modified(&self) -> bool {
        match &self.state {
            State::Unlocked(u) => u.modified,
            State::Locked => false,
        }
    }

    pub fn vault_exists(&self) -> bool {
        self.path.exists()
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Create a new, empty vault and unlock it.
    ///
    /// The empty vault is written to disk before this returns. If that
    /// write fails, the session stays locked.
    pub fn create(&mut self, password: &[u8]) -> Result<()> {
        self.ensure_locked()?;
        if self.path.exists() {
            return Err(AcctMgrError::VaultAlreadyExists(self.path.clone()));
        }

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let salt = generate_salt();
        let key = derive_key(password, &salt, &self.params)?;
        let key_pinned = key.is_pinned();

        self.state = State::Unlocked(Unlocked {
            key,
            salt,
            entries: EntryStore::new(),
            modified: true,
        });

        if let Err(e) = self.save() {
            self.state = State::Locked;
            return Err(e);
        }

        tracing::info!(path = %self.path.display(), key_pinned, "created vault");
        Ok(())
    }

    /// Unlock an existing vault.
    ///
    /// The header is checked before the key is derived, so a file that is
    /// obviously not a vault fails fast. On any error the session stays
    /// locked and the file is not touched.
    pub fn open(&mut self, password: &[u8]) -> Result<()> {
        self.ensure_locked()?;

        let data = format::read_container(&self.path)?;
        let header = format::read_header(&data)?;
        let key = derive_key(password, &header.salt, &self.params)?;
        let entries = format::decode(&key, &data)?;

        tracing::debug!(
            path = %self.path.display(),
            entries = entries.len(),
            key_pinned = key.is_pinned(),
            "opened vault"
        );

        self.state = State::Unlocked(Unlocked {
            key,
            salt: header.salt,
            entries,
            modified: false,
        });
        Ok(())
    }

    /// Write pending changes. Does nothing when there are none.
    ///
    /// On failure the changes stay pending, so the caller can retry.
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        let unlocked = self.unlocked_mut()?;
        if !unlocked.modified {
            return Ok(());
        }

        let started = Instant::now();
        let data = format::encode(&unlocked.key, &unlocked.salt, &unlocked.entries)?;
        format::write_container(&path, &data)?;
        unlocked.modified = false;

        tracing::debug!(
            path = %path.display(),
            entries = unlocked.entries.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "saved vault"
        );
        Ok(())
    }

    /// Save pending changes, then wipe all secrets and lock.
    ///
    /// The session is locked even if the save fails; the save error is
    /// still returned. Locking a locked session does nothing.
    pub fn lock(&mut self) -> Result<()> {
        if !self.is_unlocked() {
            return Ok(());
        }

        let saved = self.save();
        if let Err(e) = &saved {
            tracing::warn!(error = %e, "save before lock failed; unsaved changes were discarded");
        }

        // Dropping the unlocked state zeroizes the key and every record.
        self.state = State::Locked;
        tracing::debug!(path = %self.path.display(), "vault locked");
        saved
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    pub fn len(&self) -> Result<usize> {
        Ok(self.unlocked()?.entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.unlocked()?.entries.is_empty())
    }

    /// Read-only view of the records.
    pub fn entries(&self) -> Result<&EntryStore> {
        Ok(&self.unlocked()?.entries)
    }

    pub fn add(&mut self, fields: RecordFields) -> Result<usize> {
        let unlocked = self.unlocked_mut()?;
        let index = unlocked.entries.add(Record::new(fields)?)?;
        unlocked.modified = true;
        Ok(index)
    }

    pub fn get(&self, index: usize) -> Result<&Record> {
        self.unlocked()?.entries.get(index)
    }

    /// Edit a record in place. Returns whether anything changed.
    pub fn update<F>(&mut self, index: usize, mutator: F) -> Result<bool>
    where
        F: FnOnce(&mut RecordFields),
    {
        let unlocked = self.unlocked_mut()?;
        let changed = unlocked.entries.update(index, mutator)?;
        if changed {
            unlocked.modified = true;
        }
        Ok(changed)
    }

    pub fn remove(&mut self, index: usize) -> Result<()> {
        let unlocked = self.unlocked_mut()?;
        unlocked.entries.remove(index)?;
        unlocked.modified = true;
        Ok(())
    }

    pub fn search(&self, query: &str) -> Result<Vec<(usize, &Record)>> {
        Ok(self.unlocked()?.entries.search(query))
    }

    pub fn categories(&self, filter: Option<&str>) -> Result<Vec<CategoryGroup<'_>>> {
        Ok(self.unlocked()?.entries.categories(filter))
    }

    /// Hand one field of a record to `sink`.
    ///
    /// Returns `Ok(false)` without calling the sink when the field is empty.
    pub fn copy_field(
        &self,
        index: usize,
        field: Field,
        sink: &mut dyn ClipboardSink,
    ) -> Result<bool> {
        let value = self.get(index)?.get(field);
        if value.is_empty() {
            return Ok(false);
        }
        sink.set(value)?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn ensure_locked(&self) -> Result<()> {
        if self.is_unlocked() {
            return Err(AcctMgrError::CommandFailed("vault is already open".into()));
        }
        Ok(())
    }

    fn unlocked(&self) -> Result<&Unlocked> {
        match &self.state {
            State::Unlocked(u) => Ok(u),
            State::Locked => Err(AcctMgrError::VaultLocked),
        }
    }

    fn unlocked_mut(&mut self) -> Result<&mut Unlocked> {
        match &mut self.state {
            State::Unlocked(u) => Ok(u),
            State::Locked => Err(AcctMgrError::VaultLocked),
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("path", &self.path)
            .field("unlocked", &self.is_unlocked())
            .field("modified", &self.is_modified())
            .finish()
    }
}
