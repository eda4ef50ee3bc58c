//! Runtime error types.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur during runtime operations.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Loading the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A module with the same name is already registered.
    #[error("Module already registered: {0}")]
    ModuleExists(String),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
