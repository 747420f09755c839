//! Account records stored inside a vault.
//!
//! A `Record` is one credential entry: seven text fields plus creation and
//! last-modified timestamps. Every text field has a byte-length limit that
//! matches its slot in the on-disk layout; over-long values are rejected
//! with `FieldTooLong` rather than cut short. Records zeroize their text
//! on drop.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{AcctMgrError, Result};

/// Category assigned when none is given.
pub const DEFAULT_CATEGORY: &str = "general";

/// The text fields of a record, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Category,
    Username,
    Secret,
    Url,
    KeyFile,
    Notes,
}

impl Field {
    /// All fields in serialization order.
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Category,
        Field::Username,
        Field::Secret,
        Field::Url,
        Field::KeyFile,
        Field::Notes,
    ];

    /// Maximum length of the field in bytes.
    pub const fn max_len(self) -> usize {
        match self {
            Field::Name => 64,
            Field::Category => 32,
            Field::Username => 64,
            Field::Secret => 128,
            Field::Url => 256,
            Field::KeyFile => 256,
            Field::Notes => 512,
        }
    }

    /// Human-readable field name used in messages.
    pub const fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Category => "Category",
            Field::Username => "Username",
            Field::Secret => "Password",
            Field::Url => "URL",
            Field::KeyFile => "SSH key path",
            Field::Notes => "Notes",
        }
    }

    /// Parse the field names accepted by `cp`.
    pub fn parse(s: &str) -> Option<Field> {
        match s {
            "pass" | "password" => Some(Field::Secret),
            "user" | "username" => Some(Field::Username),
            "url" => Some(Field::Url),
            "ssh" => Some(Field::KeyFile),
            _ => None,
        }
    }
}

/// Editable text content of a record.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RecordFields {
    pub name: String,
    pub category: String,
    pub username: String,
    pub secret: String,
    pub url: String,
    pub key_file: String,
    pub notes: String,
}

impl RecordFields {
    /// Start a field set with just a name.
    pub fn named(name: impl Into<String>) -> Self {
        let mut fields = Self::default();
        fields.name = name.into();
        fields
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Category => &self.category,
            Field::Username => &self.username,
            Field::Secret => &self.secret,
            Field::Url => &self.url,
            Field::KeyFile => &self.key_file,
            Field::Notes => &self.notes,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Name => &mut self.name,
            Field::Category => &mut self.category,
            Field::Username => &mut self.username,
            Field::Secret => &mut self.secret,
            Field::Url => &mut self.url,
            Field::KeyFile => &mut self.key_file,
            Field::Notes => &mut self.notes,
        }
    }

    /// Fill in the default category when it is blank.
    fn normalize(&mut self) {
        if self.category.trim().is_empty() {
            self.category.zeroize();
            self.category.push_str(DEFAULT_CATEGORY);
        }
    }

    /// Check the name is present and every field fits its slot.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AcctMgrError::EmptyName);
        }
        for field in Field::ALL {
            let len = self.get(field).len();
            if len > field.max_len() {
                return Err(AcctMgrError::FieldTooLong {
                    field: field.label(),
                    len,
                    max: field.max_len(),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RecordFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordFields")
            .field("name", &self.name)
            .field("category", &self.category)
            .field("username", &self.username)
            .field("secret", &"[redacted]")
            .field("url", &self.url)
            .field("key_file", &self.key_file)
            .field("notes", &self.notes)
            .finish()
    }
}

/// A single account record.
#[derive(Debug, Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Record {
    fields: RecordFields,

    /// When this record was first created.
    #[zeroize(skip)]
    created_at: DateTime<Utc>,

    /// When any field of this record last changed.
    #[zeroize(skip)]
    updated_at: DateTime<Utc>,
}

impl Record {
    /// Validate `fields` and stamp both timestamps with the current time.
    pub fn new(mut fields: RecordFields) -> Result<Self> {
        fields.normalize();
        fields.validate()?;
        let now = now();
        Ok(Self {
            fields,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuild a record read back from a vault file.
    pub(crate) fn from_parts(
        fields: RecordFields,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self> {
        fields.validate()?;
        Ok(Self {
            fields,
            created_at,
            updated_at,
        })
    }

    pub fn fields(&self) -> &RecordFields {
        &self.fields
    }

    pub fn get(&self, field: Field) -> &str {
        self.fields.get(field)
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn category(&self) -> &str {
        &self.fields.category
    }

    pub fn username(&self) -> &str {
        &self.fields.username
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Replace the text fields after validating them.
    ///
    /// Returns `Ok(false)` and leaves `updated_at` alone if nothing changed.
    pub(crate) fn apply(&mut self, mut fields: RecordFields) -> Result<bool> {
        fields.normalize();
        fields.validate()?;
        if fields == self.fields {
            return Ok(false);
        }
        self.fields = fields;
        self.updated_at = now();
        Ok(true)
    }

    /// Case-insensitive substring match across the searchable fields.
    ///
    /// `needle` must already be lower-cased.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        [
            Field::Name,
            Field::Username,
            Field::Url,
            Field::Notes,
            Field::Category,
        ]
        .iter()
        .any(|&f| self.get(f).to_lowercase().contains(needle))
    }
}

/// Current time at the whole-second precision the vault file stores.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}
