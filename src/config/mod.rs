//! Configuration loaded from `.acctmgr.toml`.

pub mod settings;

pub use settings::Settings;
