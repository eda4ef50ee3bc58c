//! The built-in `help` command.
//!
//! `help NAME...` answers, in private, one line per requested command that
//! this module knows about:
//!
//! ```text
//! Module Echo, help for 'echo': Repeats the given text. Syntax: echo TEXT
//! ```
//!
//! Names the module does not know are skipped without a reply, so that when
//! several modules receive the same request each one answers only for its
//! own commands. A bare `help` produces nothing here.

use chorus_core::Message;

use crate::command::{ArgSpec, Arity, Command, CommandArgs, HandlerResult};
use crate::module::Module;
use crate::responder::Responder;

/// Name of the built-in help command.
pub const HELP_COMMAND: &str = "help";

/// Placeholder used for commands without a description.
pub const NO_HELP: &str = "No help available.";

const HELP_DESCRIPTION: &str = "If COMMAND is specified sends detailed help for the commands in a \
     private message.

     Syntax: help [COMMAND ...]";

/// Commands every module starts with.
pub(crate) fn builtin_commands<M: Module>() -> Vec<Command<M>> {
    vec![help_command()]
}

/// The `help` command entry.
pub fn help_command<M: Module>() -> Command<M> {
    Command::new(HELP_COMMAND, command_help::<M>)
        .description(HELP_DESCRIPTION)
        .args(ArgSpec::new().arg("command_names", Arity::ZeroOrMore))
}

fn command_help<M: Module>(
    _module: &M,
    responder: &Responder<M>,
    msg: &Message,
    args: &CommandArgs,
) -> HandlerResult {
    for name in args.get("command_names") {
        if let Some(line) = help_line(responder, name) {
            responder.respond(msg, line, true)?;
        }
    }
    Ok(())
}

/// Builds the help line for `name`, or `None` if there is nothing to say.
pub fn help_line<M: Module>(responder: &Responder<M>, name: &str) -> Option<String> {
    let registry = responder.registry();
    if registry.ignore_help() && name == HELP_COMMAND {
        return None;
    }
    let command = registry.get_handler(name)?;
    Some(format_help(responder.name(), name, command.get_description()))
}

/// Formats a help line.
///
/// Line breaks in the description become spaces and runs of spaces collapse
/// to one. Only a missing or empty description counts as no help; blank
/// text is kept as it is.
pub fn format_help(module: &str, name: &str, description: Option<&str>) -> String {
    let body = match description.filter(|text| !text.is_empty()) {
        Some(text) => text.lines().collect::<Vec<_>>().join(" "),
        None => NO_HELP.to_string(),
    };
    collapse_spaces(&format!("Module {module}, help for '{name}': {body}"))
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    for ch in text.chars() {
        if ch == ' ' {
            if !last_was_space {
                out.push(ch);
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chorus_core::Message;

    use super::*;
    use crate::config::ConfigStore;
    use crate::responder::MessageSink;
    use crate::testing::{Echo, RecordingBus};

    fn echo_responder() -> (Responder<Echo>, Arc<RecordingBus>) {
        let bus = Arc::new(RecordingBus::default());
        let responder = Responder::new(Echo::default(), ConfigStore::new(), bus.clone());
        (responder, bus)
    }

    fn privmsg(text: &str) -> Message {
        Message::privmsg("#rust", text).with_nickname("alice")
    }

    #[test]
    fn test_format_without_description() {
        assert_eq!(
            format_help("X", "echo", None),
            "Module X, help for 'echo': No help available."
        );
        assert_eq!(
            format_help("X", "echo", Some("")),
            "Module X, help for 'echo': No help available."
        );
    }

    #[test]
    fn test_format_keeps_blank_description() {
        assert_eq!(
            format_help("X", "echo", Some("  \n ")),
            "Module X, help for 'echo': "
        );
        assert_eq!(
            format_help("X", "echo", Some("\n  Sends text back.\n")),
            "Module X, help for 'echo': Sends text back."
        );
    }

    #[test]
    fn test_format_collapses_whitespace() {
        let description = "Sends TEXT to TARGET.\n\n        Syntax:   say TARGET TEXT\n    ";
        assert_eq!(
            format_help("Echo", "say", Some(description)),
            "Module Echo, help for 'say': Sends TEXT to TARGET. Syntax: say TARGET TEXT "
        );
    }

    #[test]
    fn test_help_replies_privately_per_command() {
        let (responder, bus) = echo_responder();
        responder.on_message_in(&privmsg(".help echo say")).unwrap();

        let sent = bus.sent();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|msg| msg.target() == Some("alice")));
        assert_eq!(
            sent[0].payload(),
            Some("Module Echo, help for 'echo': No help available.")
        );
        assert_eq!(
            sent[1].payload(),
            Some("Module Echo, help for 'say': Sends TEXT to TARGET. Syntax: say TARGET TEXT")
        );
    }

    #[test]
    fn test_help_without_arguments_is_silent() {
        let (responder, bus) = echo_responder();
        responder.on_message_in(&privmsg(".help")).unwrap();
        assert!(bus.sent().is_empty());
    }

    #[test]
    fn test_help_skips_unknown_and_ignored_names() {
        let (responder, bus) = echo_responder();
        responder.on_message_in(&privmsg(".help help nope echo")).unwrap();

        let sent = bus.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].payload(),
            Some("Module Echo, help for 'echo': No help available.")
        );
    }

    #[test]
    fn test_help_describes_itself_when_not_ignored() {
        let bus = Arc::new(RecordingBus::default());
        let responder = Responder::new(
            Echo {
                show_help: true,
                ..Default::default()
            },
            ConfigStore::new(),
            bus.clone(),
        );
        assert_eq!(
            help_line(&responder, "help").as_deref(),
            Some(
                "Module Echo, help for 'help': If COMMAND is specified sends detailed help for \
                 the commands in a private message. Syntax: help [COMMAND ...]"
            )
        );
    }
}
