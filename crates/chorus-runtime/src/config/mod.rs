//! Configuration loading for the Chorus runtime.
//!
//! The file holds two sections: `logging`, consumed by
//! [`crate::logging`], and `module_config`, the nested
//! `namespace -> name -> key` tree modules read their options from.

pub mod error;
pub mod loader;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{ChorusConfig, LogFormat, LogLevel, LogOutput, LoggingConfig, SpanEventConfig};
