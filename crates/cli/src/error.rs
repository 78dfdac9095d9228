//! Error types for CLI operations.

use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// The emitted record was not delivered cleanly
    #[error("Delivery failed for {failed} of {total} records")]
    Delivery { failed: u64, total: u64 },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn delivery(failed: u64, total: u64) -> Self {
        Self::Delivery { failed, total }
    }
}
