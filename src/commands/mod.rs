//! CLI command implementations for codemask operations.
//!
//! Available commands:
//! - **obfuscate**: run the full rename pipeline over a project
//! - **init**: create a `.codemask.toml` configuration file
//! - **clean**: remove a project's incremental cache

pub mod clean;
pub mod init;
pub mod obfuscate;

pub use clean::clean_cache;
pub use init::init_config;
pub use obfuscate::{handle_obfuscate, ObfuscateConfig};
