//! Error types for the agent core

use thiserror::Error;

/// Core error type for agent operations
#[derive(Error, Debug)]
pub enum AgentError {
    /// Requested action mode is not registered
    #[error("{0} is not a valid action mode")]
    InvalidMode(String),

    /// Value estimation did not finish before its deadline
    #[error("Estimator timed out after {timeout_ms} ms")]
    EstimatorTimeout {
        /// Configured ceiling for the call
        timeout_ms: u64,
    },

    /// Value estimator failure
    #[error("Estimator error: {0}")]
    Estimator(String),

    /// Perception transform failure
    #[error("Perception error: {0}")]
    Perception(String),

    /// Replay store failure
    #[error("Replay store error: {0}")]
    ReplayStore(String),

    /// Learning update failure
    #[error("Learner error: {0}")]
    Learner(String),

    /// Dimension mismatch
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Size the agent was configured for
        expected: usize,
        /// Size actually received
        actual: usize,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AgentError {
    /// Whether this error is the estimator deadline being exceeded
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::EstimatorTimeout { .. })
    }
}

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
