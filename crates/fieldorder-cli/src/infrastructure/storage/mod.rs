//! Storage infrastructure: the host configuration file and the tool's own
//! settings.
//!
//! - `fs`       – the [`fs::FileStore`] seam over `std::fs`.
//! - `mock`     – an in-memory `FileStore` with failure injection for tests.
//! - `gateway`  – load / save of `eeschema.json` (backup, then atomic replace).
//! - `locate`   – finds `eeschema.json` on this machine.
//! - `config`   – reads `config.toml`.

pub mod config;
pub mod fs;
pub mod gateway;
pub mod locate;
pub mod mock;
