//! Binary vault container format.
//!
//! A vault file has this layout (all integers little-endian):
//!
//! ```text
//! [ACCT: 4][version: 1][salt: 16][nonce: 12][count: u32][ciphertext: count * RECORD_LEN][tag: 16]
//! ```
//!
//! - **Magic** (`ACCT`): identifies the file as an acctmgr vault.
//! - **Version**: format version (currently `1`); anything else is rejected.
//! - **Salt**: Argon2id salt, written once at creation and never changed.
//! - **Nonce**: AES-GCM nonce, regenerated on every save.
//! - **Count**: number of records in the ciphertext.
//! - **Ciphertext + tag**: AES-256-GCM over the serialized records, with the
//!   37 header bytes as associated data.
//!
//! Each record is a fixed-size block: for every field, a `u16` byte length
//! followed by a zero-padded slot of the field's maximum size, then the
//! creation and update times as `i64` Unix seconds.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};

use super::record::{Field, Record, RecordFields};
use super::store::{EntryStore, MAX_ENTRIES};
use crate::crypto::keys::scratch;
use crate::crypto::{self, VaultKey, NONCE_LEN, SALT_LEN, TAG_LEN};
use crate::errors::{AcctMgrError, Result};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every vault file.
const MAGIC: &[u8; 4] = b"ACCT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

const SALT_OFFSET: usize = 5;
const NONCE_OFFSET: usize = SALT_OFFSET + SALT_LEN;
const COUNT_OFFSET: usize = NONCE_OFFSET + NONCE_LEN;

/// Fixed-size header: magic + version + salt + nonce + count.
pub const HEADER_LEN: usize = COUNT_OFFSET + 4;

/// Size of the length prefix in front of each field slot.
const FIELD_PREFIX_LEN: usize = 2;

/// Size of one serialized record.
pub const RECORD_LEN: usize = fields_len() + 8 + 8;

const fn fields_len() -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < Field::ALL.len() {
        total += FIELD_PREFIX_LEN + Field::ALL[i].max_len();
        i += 1;
    }
    total
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// The cleartext header of a vault container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub version: u8,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub record_count: u32,
}

impl ContainerHeader {
    fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[..4].copy_from_slice(MAGIC);
        out[4] = self.version;
        out[SALT_OFFSET..NONCE_OFFSET].copy_from_slice(&self.salt);
        out[NONCE_OFFSET..COUNT_OFFSET].copy_from_slice(&self.nonce);
        out[COUNT_OFFSET..HEADER_LEN].copy_from_slice(&self.record_count.to_le_bytes());
        out
    }

    /// Total container length implied by the record count.
    fn container_len(&self) -> usize {
        HEADER_LEN + self.record_count as usize * RECORD_LEN + TAG_LEN
    }
}

/// Parse and validate the header of a container.
///
/// Checks size, magic, version, declared count and total length. This is
/// cheap, so callers run it before the slow key derivation.
pub fn read_header(data: &[u8]) -> Result<ContainerHeader> {
    if data.len() < HEADER_LEN + TAG_LEN {
        return Err(AcctMgrError::InvalidVaultFormat(
            "file too small to be a valid vault".into(),
        ));
    }

    if &data[..4] != MAGIC {
        return Err(AcctMgrError::InvalidVaultFormat(
            "missing ACCT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(AcctMgrError::InvalidVaultFormat(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let mut salt = [0u8; SALT_LEN];
    salt.copy_from_slice(&data[SALT_OFFSET..NONCE_OFFSET]);
    let mut nonce = [0u8; NONCE_LEN];
    nonce.copy_from_slice(&data[NONCE_OFFSET..COUNT_OFFSET]);
    let mut count_bytes = [0u8; 4];
    count_bytes.copy_from_slice(&data[COUNT_OFFSET..HEADER_LEN]);
    let record_count = u32::from_le_bytes(count_bytes);

    if record_count as usize > MAX_ENTRIES {
        return Err(AcctMgrError::CapacityExceeded {
            requested: record_count as usize,
            capacity: MAX_ENTRIES,
        });
    }

    let header = ContainerHeader {
        version,
        salt,
        nonce,
        record_count,
    };

    let expected = header.container_len();
    if data.len() != expected {
        return Err(AcctMgrError::InvalidVaultFormat(format!(
            "vault is {} bytes but its header implies {expected}",
            data.len()
        )));
    }

    Ok(header)
}

// ---------------------------------------------------------------------------
// Encode / decode
// ---------------------------------------------------------------------------

/// Serialize and encrypt `entries` into a complete container.
///
/// A fresh nonce is drawn for every call; `salt` is the vault's original
/// salt and is copied into the header unchanged.
pub fn encode(key: &VaultKey, salt: &[u8; SALT_LEN], entries: &EntryStore) -> Result<Vec<u8>> {
    let count = entries.len();
    let record_count = u32::try_from(count).map_err(|_| AcctMgrError::CapacityExceeded {
        requested: count,
        capacity: MAX_ENTRIES,
    })?;

    let header = ContainerHeader {
        version: CURRENT_VERSION,
        salt: *salt,
        nonce: crypto::generate_nonce(),
        record_count,
    };
    let header_bytes = header.to_bytes();

    let mut plaintext = scratch(count * RECORD_LEN);
    for record in entries.iter() {
        write_record(&mut plaintext, record);
    }

    let ciphertext = crypto::seal(key, &header.nonce, &header_bytes, &plaintext)?;

    let mut out = Vec::with_capacity(HEADER_LEN + ciphertext.len());
    out.extend_from_slice(&header_bytes);
    out.extend_from_slice(&ciphertext);
    Ok(out)
}

/// Verify, decrypt and deserialize a container.
///
/// Either every record is decoded or an error is returned; the decrypted
/// scratch buffer is wiped on both paths.
pub fn decode(key: &VaultKey, data: &[u8]) -> Result<EntryStore> {
    let header = read_header(data)?;

    let plaintext = crypto::open(
        key,
        &header.nonce,
        &data[..HEADER_LEN],
        &data[HEADER_LEN..],
    )?;

    let count = header.record_count as usize;
    if plaintext.len() != count * RECORD_LEN {
        return Err(AcctMgrError::InvalidVaultFormat(
            "decrypted payload has the wrong length".into(),
        ));
    }

    let mut records = Vec::with_capacity(count);
    for block in plaintext.chunks_exact(RECORD_LEN) {
        records.push(read_record(block)?);
    }

    EntryStore::from_records(records)
}

fn write_record(buf: &mut Vec<u8>, record: &Record) {
    for field in Field::ALL {
        let value = record.get(field).as_bytes();
        // Records are validated on construction, so `value` fits its slot.
        let len = value.len().min(field.max_len());
        buf.extend_from_slice(&(len as u16).to_le_bytes());
        buf.extend_from_slice(&value[..len]);
        buf.resize(buf.len() + field.max_len() - len, 0);
    }
    buf.extend_from_slice(&record.created_at().timestamp().to_le_bytes());
    buf.extend_from_slice(&record.updated_at().timestamp().to_le_bytes());
}

fn read_record(block: &[u8]) -> Result<Record> {
    let mut fields = RecordFields::default();
    let mut pos = 0;

    for field in Field::ALL {
        let len = u16::from_le_bytes([block[pos], block[pos + 1]]) as usize;
        pos += FIELD_PREFIX_LEN;
        if len > field.max_len() {
            return Err(AcctMgrError::InvalidVaultFormat(format!(
                "{} length {len} exceeds its slot",
                field.label()
            )));
        }
        let text = std::str::from_utf8(&block[pos..pos + len]).map_err(|_| {
            AcctMgrError::InvalidVaultFormat(format!("{} is not valid UTF-8", field.label()))
        })?;
        fields.get_mut(field).push_str(text);
        pos += field.max_len();
    }

    let created_at = read_timestamp(&block[pos..pos + 8])?;
    let updated_at = read_timestamp(&block[pos + 8..pos + 16])?;

    Record::from_parts(fields, created_at, updated_at)
}

fn read_timestamp(bytes: &[u8]) -> Result<DateTime<Utc>> {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(bytes);
    let secs = i64::from_le_bytes(raw);
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| AcctMgrError::InvalidVaultFormat(format!("timestamp {secs} out of range")))
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Read a container from disk.
pub fn read_container(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(AcctMgrError::VaultNotFound(path.to_path_buf()));
    }
    Ok(fs::read(path)?)
}

/// Write a container to disk **atomically** with owner-only permissions.
///
/// 1. Create a temp file (mode 0600) in the same directory.
/// 2. Write and fsync it.
/// 3. Rename it over the target path.
///
/// The rename ensures readers never see a half-written vault. On failure
/// the temp file is removed and the original vault is left untouched.
pub fn write_container(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    let result = write_private(&tmp_path, data).and_then(|()| fs::rename(&tmp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    Ok(())
}

fn write_private(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;

    // A leftover temp file keeps its old mode, so set it explicitly too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(data)?;
    file.sync_all()
}
