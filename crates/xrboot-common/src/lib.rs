//! Shared utilities for xrboot: configuration, logging, error types.
//!
//! This crate provides common infrastructure used by the bootstrap library and
//! its hosts.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;

pub use config::{BootConfig, CONFIG_ASSET};
pub use error::{Error, Result};

/// Initialize tracing with a specific default level.
///
/// Records emitted through the `log` facade by the bootstrap crates are
/// forwarded to the same subscriber.
pub fn init_tracing_with_default(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
