//! Hook error types

use thiserror::Error;

/// Errors raised by the hooks crate
#[derive(Error, Debug)]
pub enum HooksError {
    /// Configuration text could not be parsed
    #[error("invalid hooks config: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for hook operations
pub type Result<T> = std::result::Result<T, HooksError>;
