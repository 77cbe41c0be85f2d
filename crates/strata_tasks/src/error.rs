//! # Task Errors

use thiserror::Error;

/// Errors from the worker pool.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    /// Configuration could not be parsed.
    #[error("Failed to parse worker config: {0}")]
    ConfigParse(String),

    /// Configuration values are out of range.
    #[error("Invalid worker config: {0}")]
    InvalidConfig(String),

    /// The operating system refused to start a worker thread.
    #[error("Failed to spawn worker thread '{name}': {reason}")]
    Spawn {
        /// Thread name.
        name: String,
        /// OS error text.
        reason: String,
    },

    /// The pool has stopped accepting jobs.
    #[error("Worker pool is shut down")]
    ShutDown,
}

/// Result type for task operations.
pub type TaskResult<T> = Result<T, TaskError>;
