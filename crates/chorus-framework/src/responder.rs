//! The [`Responder`]: a module composed with its configuration, its command
//! table and the event bus.
//!
//! ```rust,ignore
//! use chorus_framework::{ConfigStore, MessageSink, Responder};
//!
//! let responder = Responder::new(Echo::default(), store, bus);
//!
//! // Inbound channel: hand every message to the responder, in order.
//! responder.on_message_in(&msg)?;
//! ```
//!
//! Handlers reply through [`Responder::respond`], which picks the destination
//! from the message being answered: the channel it was sent to, or the sender
//! when it was sent privately (or when a private reply is requested).

use std::sync::Arc;

use chorus_core::{ChannelExt, EventBus, Message, error_chain};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::command::CommandRegistry;
use crate::config::{ConfigResolver, ConfigStore};
use crate::dispatcher::dispatch;
use crate::error::{ConfigResult, DispatchError, RespondError};
use crate::matcher;
use crate::module::Module;

/// Namespace of the configuration section shared by all responders.
pub const BASE_CONFIG_NAMESPACE: &str = "chorus";

/// Name of the configuration section shared by all responders.
pub const BASE_CONFIG_NAME: &str = "base_responder";

/// Config key holding the command prefix.
pub const COMMAND_PREFIX_KEY: &str = "command_prefix";

/// Defaults every responder starts with.
pub fn base_default_config() -> Value {
    json!({ COMMAND_PREFIX_KEY: "." })
}

/// A module wired to its configuration, command table and event bus.
pub struct Responder<M> {
    module: M,
    name: String,
    config: ConfigResolver,
    registry: CommandRegistry<M>,
    bus: Arc<dyn EventBus>,
}

impl<M: Module> Responder<M> {
    /// Wraps `module`.
    ///
    /// The command table is built here and never changes afterwards. Defaults
    /// are folded in base-first, then the shared `chorus.base_responder`
    /// section and the module's own section (if any) are registered.
    pub fn new(module: M, store: ConfigStore, bus: Arc<dyn EventBus>) -> Self {
        let name = module.name().to_string();
        let registry = CommandRegistry::for_module(&module);

        let mut config = ConfigResolver::new(store);
        config.register_defaults(base_default_config());
        config.register_defaults(module.default_config());
        config.register_config(BASE_CONFIG_NAMESPACE, BASE_CONFIG_NAME);
        if let Some((namespace, section)) = module.config_location() {
            config.register_config(namespace, section);
        }

        debug!(
            module = %name,
            commands = ?registry.list_commands(),
            "Responder created"
        );

        Self {
            module,
            name,
            config,
            registry,
            bus,
        }
    }

    /// Returns the wrapped module.
    pub fn module(&self) -> &M {
        &self.module
    }

    /// Returns the module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the configuration resolver.
    pub fn config(&self) -> &ConfigResolver {
        &self.config
    }

    /// Returns the command table.
    pub fn registry(&self) -> &CommandRegistry<M> {
        &self.registry
    }

    /// Resolves a config key.
    pub fn config_get(&self, key: &str) -> ConfigResult<Value> {
        self.config.get(key)
    }

    /// Writes a config key into the module's own section.
    pub fn config_set(&self, key: &str, value: Value) -> ConfigResult<()> {
        self.config.set(key, value)
    }

    /// Appends to an array config key in the module's own section.
    pub fn config_append(&self, key: &str, value: Value) -> ConfigResult<()> {
        self.config.append(key, value)
    }

    /// Returns the current command prefix.
    pub fn command_prefix(&self) -> ConfigResult<String> {
        self.config.get_str(COMMAND_PREFIX_KEY)
    }

    /// Checks whether `msg` invokes a command.
    ///
    /// With `command_name` the first payload token must be exactly the prefix
    /// followed by that name; without it the payload only has to start with
    /// the prefix. `prefix` overrides the configured command prefix.
    pub fn is_command(
        &self,
        msg: &Message,
        command_name: Option<&str>,
        prefix: Option<&str>,
    ) -> ConfigResult<bool> {
        let prefix = match prefix {
            Some(prefix) => prefix.to_string(),
            None => self.command_prefix()?,
        };
        Ok(matcher::is_command(msg, &prefix, command_name))
    }

    /// Returns every command this module supports.
    pub fn get_all_commands(&self) -> Vec<&str> {
        self.registry.list_commands()
    }

    /// Replies to `msg`.
    ///
    /// The reply goes to the channel `msg` was sent to, unless `as_private`
    /// is set or `msg` was not sent to a channel, in which case it goes to the
    /// sender.
    pub fn respond(
        &self,
        msg: &Message,
        text: impl Into<String>,
        as_private: bool,
    ) -> Result<(), RespondError> {
        let target = match msg.target() {
            Some(target) if !as_private && target.is_channel_name() => target,
            _ => msg.nickname().ok_or_else(|| RespondError::NoRecipient {
                command: msg.command.clone(),
            })?,
        };
        self.send_privmsg(target, text);
        Ok(())
    }

    /// Emits a `PRIVMSG` to an explicit target.
    pub fn send_privmsg(&self, target: &str, text: impl Into<String>) {
        let response = Message::privmsg(target, text);
        debug!(module = %self.name, target, "Sending message");
        self.bus.message_out(&self.name, response);
    }
}

/// Object-safe entry point of the inbound channel.
///
/// Lets a host keep responders over different module types in one list.
pub trait MessageSink: Send + Sync {
    /// Name of the module behind this sink.
    fn module_name(&self) -> &str;

    /// Dispatches one inbound message.
    ///
    /// Errors are reported on the bus error channel before being returned.
    fn on_message_in(&self, msg: &Message) -> Result<(), DispatchError>;
}

impl<M: Module> MessageSink for Responder<M> {
    fn module_name(&self) -> &str {
        &self.name
    }

    fn on_message_in(&self, msg: &Message) -> Result<(), DispatchError> {
        dispatch(self, msg).inspect_err(|err| {
            error!(module = %self.name, error = %error_chain(err), "Dispatch failed");
            self.bus.on_exception(&self.name, err);
        })
    }
}
