//! Layered error definitions
//!
//! `SinkError` is the runtime outcome of `Sink::handle`; `ContractError`
//! covers configuration loading and validation.

use std::fmt;
use thiserror::Error;

/// Failure reported by a sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    Write { sink_name: String, message: String },

    /// Sink panicked while handling a record
    #[error("sink '{sink_name}' panicked: {message}")]
    Panic { sink_name: String, message: String },

    /// Joined failures of several children
    #[error("{}", Joined(.0))]
    Aggregate(Vec<SinkError>),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

struct Joined<'a>(&'a [SinkError]);

impl fmt::Display for Joined<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{err}")?;
        }
        Ok(())
    }
}

impl SinkError {
    /// Create sink write error
    pub fn write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Write {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Create sink panic error
    pub fn panic(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Panic {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Join child failures: `Ok` when there are none
    pub fn join(errors: Vec<SinkError>) -> Result<(), SinkError> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self::Aggregate(errors))
        }
    }

    /// Leaf errors, with aggregates expanded recursively
    pub fn errors(&self) -> Vec<&SinkError> {
        match self {
            Self::Aggregate(children) => children.iter().flat_map(|e| e.errors()).collect(),
            other => vec![other],
        }
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panic { .. })
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ContractError {
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}
