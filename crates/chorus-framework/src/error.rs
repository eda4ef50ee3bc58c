//! Error types for the Chorus framework.

use std::fmt;

use chorus_core::BoxError;
use thiserror::Error;

/// Errors raised while reading or writing module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigKeyError {
    /// The key is set neither in a registered location nor in the defaults.
    #[error("config key '{key}' is not set")]
    NotFound {
        /// The requested key.
        key: String,
    },

    /// The key exists but holds a value of the wrong shape.
    #[error("config key '{key}' has an unexpected type: {reason}")]
    InvalidType {
        /// The requested key.
        key: String,
        /// Why the value could not be used.
        reason: String,
    },

    /// A write was attempted before any config location was registered.
    #[error("cannot write config key '{key}': no config location registered")]
    NoLocation {
        /// The key being written.
        key: String,
    },
}

impl ConfigKeyError {
    /// Creates a not-found error.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Creates an invalid-type error.
    pub fn invalid_type(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidType {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigKeyError>;

/// Argument parsing failed for a command invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid arguments for '{command}': {message}")]
pub struct ArgsError {
    /// The command whose arguments were rejected.
    pub command: String,
    /// Parser diagnostic.
    pub message: String,
}

/// Errors raised by [`Responder::respond`](crate::Responder::respond).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RespondError {
    /// The message carries neither a target nor a sender to reply to.
    #[error("cannot respond to '{command}': no target and no sender nickname")]
    NoRecipient {
        /// Command of the message being answered.
        command: String,
    },
}

/// The pipeline stage an error escaped from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The general handler, run for every message.
    General,
    /// The `PRIVMSG` handler.
    Privmsg,
    /// Command matching and the command handler.
    Command,
}

impl Stage {
    /// Returns the stage name as used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Privmsg => "privmsg",
            Self::Command => "command",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error escaped one of the dispatch stages.
///
/// The remaining stages were not run. The error has already been reported on
/// the bus error channel when the caller sees it.
#[derive(Debug, Error)]
#[error("module '{module}' failed in the {stage} stage")]
pub struct DispatchError {
    /// Name of the module that was dispatching.
    pub module: String,
    /// Stage that failed.
    pub stage: Stage,
    /// Command being run, for failures in the command stage.
    pub command: Option<String>,
    /// The underlying error.
    #[source]
    pub source: BoxError,
}

impl DispatchError {
    /// Creates a dispatch error for a stage.
    pub fn new(module: impl Into<String>, stage: Stage, source: BoxError) -> Self {
        Self {
            module: module.into(),
            stage,
            command: None,
            source,
        }
    }

    /// Attaches the name of the command that failed.
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}
