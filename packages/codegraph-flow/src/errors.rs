//! Error types for codegraph-flow
//!
//! Only genuine precondition violations surface as errors. Lookup misses
//! are modelled as `Option`/empty results and cancellation is reported
//! through `Completion::Cancelled`.

use crate::config::ConfigError;
use thiserror::Error;

/// Main error type for propagation operations
#[derive(Debug, Error)]
pub enum FlowError {
    /// Caller passed an argument that violates a precondition
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A required collaborator was never installed
    #[error("Unconfigured dependency: {0}")]
    Unconfigured(String),

    /// Operation is not legal in the current graph state
    #[error("Invalid usage: {0}")]
    InvalidUsage(String),

    /// Error reported by an external collaborator callback
    #[error("Processor error: {0}")]
    Processor(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FlowError {
    /// Create an invalid-argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        FlowError::InvalidArgument(msg.into())
    }

    /// Create an unconfigured-dependency error
    pub fn unconfigured(msg: impl Into<String>) -> Self {
        FlowError::Unconfigured(msg.into())
    }

    /// Create an invalid-usage error
    pub fn invalid_usage(msg: impl Into<String>) -> Self {
        FlowError::InvalidUsage(msg.into())
    }

    /// Create a collaborator error
    pub fn processor(msg: impl Into<String>) -> Self {
        FlowError::Processor(msg.into())
    }
}

/// Result type alias for propagation operations
pub type FlowResult<T> = std::result::Result<T, FlowError>;
