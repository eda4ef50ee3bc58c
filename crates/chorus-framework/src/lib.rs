//! # Chorus Framework
//!
//! The command-dispatch engine for reactive chat modules.
//!
//! This layer provides:
//! - [`Module`]: the trait a chat module implements
//! - [`Responder`]: a module composed with its config, command table and bus
//! - [`ConfigResolver`]: layered defaults plus namespaced live configuration
//! - [`CommandRegistry`] and [`Command`]: the explicit command table
//! - [`matcher`]: prefix and command-name matching
//! - Argument parsing for declared [`ArgSpec`]s (clap based)
//! - The built-in `help` command
//! - [`builtin`]: ready-made modules, such as the `s/old/new/` corrector
//!
//! ```rust,ignore
//! use chorus_framework::prelude::*;
//!
//! #[derive(Default)]
//! struct Echo;
//!
//! impl Echo {
//!     fn command_echo(
//!         &self,
//!         responder: &Responder<Self>,
//!         msg: &Message,
//!         args: &CommandArgs,
//!     ) -> HandlerResult {
//!         responder.respond(msg, args.rest(), false)?;
//!         Ok(())
//!     }
//! }
//!
//! impl Module for Echo {
//!     fn commands(&self) -> Vec<Command<Self>> {
//!         vec![Command::new("echo", Self::command_echo).description("Repeats TEXT.")]
//!     }
//! }
//!
//! let responder = Responder::new(Echo, ConfigStore::new(), bus);
//! responder.on_message_in(&Message::privmsg("#rust", ".echo hi").with_nickname("alice"))?;
//! ```

pub mod builtin;
pub mod command;
pub mod config;
mod dispatcher;
pub mod error;
pub mod help;
pub mod matcher;
pub mod module;
pub mod responder;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{
    ArgSpec, Arity, Command, CommandArgs, CommandRegistry, HandlerFn, HandlerResult, parse_args,
};
pub use config::{ConfigResolver, ConfigStore};
pub use error::{ArgsError, ConfigKeyError, ConfigResult, DispatchError, RespondError, Stage};
pub use help::{HELP_COMMAND, format_help};
pub use module::Module;
pub use responder::{MessageSink, Responder, base_default_config};

/// Prelude for writing modules.
pub mod prelude {
    pub use super::{
        ArgSpec, Arity, Command, CommandArgs, ConfigStore, HandlerResult, MessageSink, Module,
        Responder,
    };
    pub use chorus_core::prelude::*;
}
