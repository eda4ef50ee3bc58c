//! The per-module command table.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use super::Command;
use crate::help::{HELP_COMMAND, builtin_commands};
use crate::module::Module;

/// Name -> handler table, fixed once the module is constructed.
///
/// Built from the built-in commands (`help`) followed by the module's own
/// registration table; a module entry with an existing name replaces it.
/// Entries whose [`ArgSpec`](super::ArgSpec) fails validation are dropped
/// with a warning, so they never reach the argument parser.
pub struct CommandRegistry<M> {
    commands: BTreeMap<String, Command<M>>,
    ignore_help: bool,
}

impl<M: Module> CommandRegistry<M> {
    /// Builds the table for `module`.
    pub fn for_module(module: &M) -> Self {
        let entries = builtin_commands::<M>().into_iter().chain(module.commands());
        Self::new(entries, module.ignore_help())
    }

    /// Builds a table from explicit entries.
    pub fn new(entries: impl IntoIterator<Item = Command<M>>, ignore_help: bool) -> Self {
        let mut commands = BTreeMap::new();
        for entry in entries {
            if let Some(Err(err)) = entry.arg_spec().map(|spec| spec.validate(entry.name())) {
                warn!(
                    command = entry.name(),
                    error = %err,
                    "Dropping command with an unusable argument spec"
                );
                continue;
            }
            if let Some(previous) = commands.insert(entry.name().to_string(), entry) {
                debug!(
                    command = previous.name(),
                    "Command registration replaced an earlier entry"
                );
            }
        }
        Self {
            commands,
            ignore_help,
        }
    }
}

impl<M> CommandRegistry<M> {
    /// Returns the entry registered under `name`.
    pub fn get_handler(&self, name: &str) -> Option<&Command<M>> {
        self.commands.get(name)
    }

    /// Returns the names of the registered commands.
    ///
    /// `help` is left out when `ignore_help` is set, though it stays
    /// invocable.
    pub fn list_commands(&self) -> Vec<&str> {
        self.commands
            .keys()
            .map(String::as_str)
            .filter(|name| !(self.ignore_help && *name == HELP_COMMAND))
            .collect()
    }

    /// Whether `help` is hidden from listings and help output.
    pub fn ignore_help(&self) -> bool {
        self.ignore_help
    }

    /// Number of registered commands, `help` included.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chorus_core::Message;

    use std::sync::Arc;

    use super::*;
    use crate::command::{ArgSpec, Arity, CommandArgs, HandlerResult};
    use crate::config::ConfigStore;
    use crate::responder::{MessageSink, Responder};
    use crate::testing::{Echo, RecordingBus};

    fn noop(_: &Echo, _: &Responder<Echo>, _: &Message, _: &CommandArgs) -> HandlerResult {
        Ok(())
    }

    #[test]
    fn test_help_hidden_but_resolvable() {
        let registry = CommandRegistry::for_module(&Echo::default());
        let listed: HashSet<&str> = registry.list_commands().into_iter().collect();
        assert_eq!(listed, HashSet::from(["echo", "fail", "say"]));
        assert!(registry.get_handler("help").is_some());
        assert!(registry.ignore_help());
    }

    #[test]
    fn test_help_listed_when_not_ignored() {
        let registry = CommandRegistry::new(builtin_commands::<Echo>(), false);
        assert_eq!(registry.list_commands(), vec!["help"]);
    }

    #[test]
    fn test_unknown_command_is_none() {
        let registry = CommandRegistry::for_module(&Echo::default());
        assert!(registry.get_handler("nope").is_none());
        assert!(registry.get_handler("").is_none());
    }

    #[test]
    fn test_module_entry_replaces_builtin() {
        let entries = builtin_commands::<Echo>()
            .into_iter()
            .chain([Command::new("help", noop).description("custom help")]);
        let registry = CommandRegistry::new(entries, true);
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get_handler("help").and_then(|c| c.get_description()),
            Some("custom help")
        );
    }

    struct Seen;

    impl Seen {
        fn command_mark(
            &self,
            responder: &Responder<Self>,
            msg: &Message,
            _args: &CommandArgs,
        ) -> HandlerResult {
            responder.respond(msg, "seen", false)?;
            Ok(())
        }
    }

    impl Module for Seen {
        fn commands(&self) -> Vec<Command<Self>> {
            vec![
                Command::new("seen", Self::command_mark).args(
                    ArgSpec::new()
                        .arg("channel", Arity::Optional)
                        .arg("nick", Arity::Exactly(1)),
                ),
                Command::new("last", Self::command_mark).args(
                    ArgSpec::new()
                        .arg("names", Arity::ZeroOrMore)
                        .arg("nick", Arity::Exactly(1)),
                ),
                Command::new("ok", Self::command_mark)
                    .args(ArgSpec::new().arg("nick", Arity::Exactly(1))),
            ]
        }
    }

    #[test]
    fn test_unusable_arg_specs_are_dropped() {
        let registry = CommandRegistry::for_module(&Seen);
        assert!(registry.get_handler("seen").is_none());
        assert!(registry.get_handler("last").is_none());
        assert!(registry.get_handler("ok").is_some());
    }

    #[test]
    fn test_dispatching_to_dropped_command_does_not_panic() {
        let bus = Arc::new(RecordingBus::default());
        let responder = Responder::new(Seen, ConfigStore::new(), bus.clone());

        responder.on_message_in(&Message::privmsg("#rust", ".seen bob")).unwrap();
        responder.on_message_in(&Message::privmsg("#rust", ".last a bob")).unwrap();
        assert!(bus.sent().is_empty());
        assert!(bus.errors().is_empty());

        responder.on_message_in(&Message::privmsg("#rust", ".ok bob")).unwrap();
        assert_eq!(bus.sent(), vec![Message::privmsg("#rust", "seen")]);
    }
}
