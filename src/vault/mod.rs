//! Vault module — encrypted account storage.
//!
//! This module provides:
//! - `Record`, `RecordFields` and `Field` types (`record`)
//! - The bounded, ordered `EntryStore` (`store`)
//! - Binary vault container encode/decode and atomic file I/O (`format`)
//! - The Locked/Unlocked `Session` that ties them together (`session`)

pub mod format;
pub mod record;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use format::ContainerHeader;
pub use record::{Field, Record, RecordFields, DEFAULT_CATEGORY};
pub use session::Session;
pub use store::{CategoryGroup, EntryStore, MAX_ENTRIES};
