//! Command handlers and their registration table.
//!
//! A module declares its commands as an explicit list of [`Command`] entries.
//! Each entry binds a name to a handler, optionally with a description (shown
//! by `help`) and an [`ArgSpec`] the arguments are parsed against:
//!
//! ```rust,ignore
//! impl Module for Echo {
//!     fn commands(&self) -> Vec<Command<Self>> {
//!         vec![
//!             Command::new("echo", Self::command_echo)
//!                 .description("Repeats the given text. Syntax: echo TEXT"),
//!             Command::new("say", Self::command_say).args(
//!                 ArgSpec::new()
//!                     .arg("target", Arity::Exactly(1))
//!                     .arg("text", Arity::OneOrMore),
//!             ),
//!         ]
//!     }
//! }
//! ```

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use chorus_core::{BoxError, Message};

use crate::module::Module;
use crate::responder::Responder;

pub mod args;
pub mod registry;
pub mod split;

pub use args::{ArgSpec, Arity, CommandArgs, parse_args};
pub use registry::CommandRegistry;
pub use split::shell_split;

/// Result type returned by every handler.
pub type HandlerResult = Result<(), BoxError>;

/// A type-erased command handler.
pub type HandlerFn<M> =
    Arc<dyn Fn(&M, &Responder<M>, &Message, &CommandArgs) -> HandlerResult + Send + Sync>;

/// A command entry: name, handler and the metadata `help` reports.
pub struct Command<M> {
    name: String,
    description: Option<Cow<'static, str>>,
    args: Option<ArgSpec>,
    launch_invalid: bool,
    handler: HandlerFn<M>,
}

impl<M: Module> Command<M> {
    /// Creates a command entry.
    ///
    /// By default the entry has no description, no argument spec, and is
    /// launched even when its arguments fail to parse.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&M, &Responder<M>, &Message, &CommandArgs) -> HandlerResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            args: None,
            launch_invalid: true,
            handler: Arc::new(handler),
        }
    }

    /// Attaches the descriptive text shown by `help`.
    pub fn description(mut self, text: impl Into<Cow<'static, str>>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Declares the arguments this command accepts.
    pub fn args(mut self, spec: ArgSpec) -> Self {
        self.args = Some(spec);
        self
    }

    /// Whether the handler still runs when its arguments fail to parse
    /// (default: `true`). The handler can inspect [`CommandArgs::error`].
    pub fn launch_invalid(mut self, enabled: bool) -> Self {
        self.launch_invalid = enabled;
        self
    }

    /// Invokes the handler.
    pub fn call(
        &self,
        module: &M,
        responder: &Responder<M>,
        msg: &Message,
        args: &CommandArgs,
    ) -> HandlerResult {
        (self.handler)(module, responder, msg, args)
    }
}

impl<M> Command<M> {
    /// Returns the command name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the descriptive text, if any.
    pub fn get_description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the argument spec, if any.
    pub fn arg_spec(&self) -> Option<&ArgSpec> {
        self.args.as_ref()
    }

    /// Returns whether the handler runs with invalid arguments.
    pub fn launches_invalid(&self) -> bool {
        self.launch_invalid
    }
}

impl<M> Clone for Command<M> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            args: self.args.clone(),
            launch_invalid: self.launch_invalid,
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<M> fmt::Debug for Command<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("args", &self.args)
            .field("launch_invalid", &self.launch_invalid)
            .finish_non_exhaustive()
    }
}
