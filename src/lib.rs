pub mod cli;
pub mod clipboard;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod idle;
pub mod vault;
