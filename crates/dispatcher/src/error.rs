//! Dispatcher error types

use thiserror::Error;

/// Errors raised while assembling a sink topology
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// A node references a leaf that was never declared
    #[error("unknown sink '{name}'")]
    UnknownSink { name: String },

    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Configuration error (from contract)
    #[error("contract error: {0}")]
    Contract(#[from] contracts::ContractError),
}

impl DispatcherError {
    pub fn unknown_sink(name: impl Into<String>) -> Self {
        Self::UnknownSink { name: name.into() }
    }

    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
