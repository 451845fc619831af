//! Error types for chorm

use std::time::Duration;
use thiserror::Error;

/// Result type alias for chorm operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for query building and execution.
///
/// Every variant carries owned data so a builder can keep its first error and
/// hand out the same value on every render.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrmError {
    /// Builder state cannot resolve a required table or column
    #[error("chorm: {0}")]
    Config(String),

    /// Placeholder count does not match the number of arguments
    #[error("chorm: query {sql:?} has {expected} placeholder(s) but got {got} argument(s)")]
    Fragment {
        sql: String,
        expected: usize,
        got: usize,
    },

    /// Validation error (invalid identifier, bad builder input)
    #[error("chorm: validation error: {0}")]
    Validation(String),

    /// Connection/transport error reported by a connection
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server rejected the statement
    #[error("Server error {code}: {message}")]
    Server { code: i32, message: String },

    /// The request was cancelled before it completed
    #[error("Query cancelled")]
    Cancelled,

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(Duration),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a placeholder/argument mismatch error
    pub fn fragment(sql: impl Into<String>, expected: usize, got: usize) -> Self {
        Self::Fragment {
            sql: sql.into(),
            expected,
            got,
        }
    }

    /// Create a server rejection error
    pub fn server(code: i32, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    /// Check if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a placeholder/argument mismatch
    pub fn is_fragment(&self) -> bool {
        matches!(self, Self::Fragment { .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}
