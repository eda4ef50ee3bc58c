//! The [`Module`] trait implemented by every reactive chat module.

use std::any::type_name;

use chorus_core::Message;
use serde_json::Value;

use crate::command::{Command, HandlerResult};
use crate::responder::Responder;

/// A reactive chat module.
///
/// Only [`commands`](Module::commands) is usually overridden; everything else
/// has a sensible default. The module is wrapped in a [`Responder`], which
/// builds the command table once and routes every inbound message through
/// [`handle_msg`](Module::handle_msg), [`handle_privmsg`](Module::handle_privmsg)
/// and the matching command handler.
///
/// Handlers take `&self`; modules keeping state use interior mutability.
pub trait Module: Send + Sync + Sized + 'static {
    /// Name used in logs and in help output. Defaults to the type name.
    fn name(&self) -> &str {
        short_type_name::<Self>()
    }

    /// The `(namespace, name)` section of the config store holding this
    /// module's live configuration.
    fn config_location(&self) -> Option<(&str, &str)> {
        None
    }

    /// Default options for this module, folded in after the base defaults.
    fn default_config(&self) -> Value {
        Value::Null
    }

    /// Hide `help` from command listings and help output.
    ///
    /// Every module answers `help` requests for its own commands; describing
    /// `help` itself is left to a single module that sets this to `false`.
    fn ignore_help(&self) -> bool {
        true
    }

    /// The command registration table, read once at construction.
    fn commands(&self) -> Vec<Command<Self>> {
        Vec::new()
    }

    /// Called for every inbound message.
    fn handle_msg(&self, _responder: &Responder<Self>, _msg: &Message) -> HandlerResult {
        Ok(())
    }

    /// Called for every inbound `PRIVMSG`.
    fn handle_privmsg(&self, _responder: &Responder<Self>, _msg: &Message) -> HandlerResult {
        Ok(())
    }
}

fn short_type_name<T>() -> &'static str {
    let full = type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;
    impl Module for Plain {}

    #[test]
    fn test_default_name_is_short_type_name() {
        assert_eq!(Plain.name(), "Plain");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
    }

    #[test]
    fn test_defaults() {
        assert!(Plain.ignore_help());
        assert!(Plain.commands().is_empty());
        assert!(Plain.config_location().is_none());
        assert!(Plain.default_config().is_null());
    }
}
