//! Error types for the Chorus core.

use thiserror::Error;

/// Errors produced while decoding a raw protocol line into a [`Message`].
///
/// [`Message`]: crate::Message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The line was empty or contained only whitespace.
    #[error("empty message line")]
    Empty,

    /// A prefix was present but no command followed it.
    #[error("missing command in line: {line}")]
    MissingCommand {
        /// The offending line.
        line: String,
    },
}

/// Result type for line decoding.
pub type ParseResult<T> = Result<T, ParseError>;

/// Errors produced while encoding a [`Message`] as a protocol line.
///
/// [`Message`]: crate::Message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The command or the nickname is empty or holds a space or line break.
    #[error("invalid {part} '{value}'")]
    InvalidWord {
        /// Which part of the message, `command` or `nickname`.
        part: &'static str,
        /// The offending value.
        value: String,
    },

    /// A parameter holds a carriage return or line feed.
    #[error("parameter {index} contains a line break")]
    LineBreak {
        /// Position of the parameter.
        index: usize,
    },

    /// A parameter other than the last is empty, holds a space or starts
    /// with `:`.
    #[error("parameter {index} '{param}' can only be sent as the last parameter")]
    NotLast {
        /// Position of the parameter.
        index: usize,
        /// The offending parameter.
        param: String,
    },
}
