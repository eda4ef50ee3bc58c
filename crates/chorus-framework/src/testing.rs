//! Shared fixtures for unit tests.

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};

use chorus_core::{EventBus, Message, error_chain};
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::command::{ArgSpec, Arity, Command, CommandArgs, HandlerResult};
use crate::module::Module;
use crate::responder::Responder;

/// Bus recording everything it is given.
#[derive(Default)]
pub(crate) struct RecordingBus {
    sent: Mutex<Vec<(String, Message)>>,
    errors: Mutex<Vec<(String, String)>>,
}

impl RecordingBus {
    pub(crate) fn sent(&self) -> Vec<Message> {
        self.sent.lock().iter().map(|(_, msg)| msg.clone()).collect()
    }

    pub(crate) fn modules(&self) -> Vec<String> {
        self.sent.lock().iter().map(|(module, _)| module.clone()).collect()
    }

    pub(crate) fn errors(&self) -> Vec<(String, String)> {
        self.errors.lock().clone()
    }
}

impl EventBus for RecordingBus {
    fn message_out(&self, module: &str, msg: Message) {
        self.sent.lock().push((module.to_string(), msg));
    }

    fn on_exception(&self, module: &str, error: &(dyn Error + Send + Sync + 'static)) {
        self.errors
            .lock()
            .push((module.to_string(), error_chain(error)));
    }
}

/// Module exercising every stage of the pipeline.
#[derive(Default)]
pub(crate) struct Echo {
    pub(crate) general: AtomicUsize,
    pub(crate) privmsgs: AtomicUsize,
    pub(crate) echoed: Mutex<Vec<String>>,
    pub(crate) fail_general: bool,
    pub(crate) show_help: bool,
}

impl Echo {
    fn command_echo(
        &self,
        responder: &Responder<Self>,
        msg: &Message,
        args: &CommandArgs,
    ) -> HandlerResult {
        self.echoed.lock().push(args.rest().to_string());
        responder.respond(msg, args.rest(), false)?;
        Ok(())
    }

    fn command_say(
        &self,
        responder: &Responder<Self>,
        _msg: &Message,
        args: &CommandArgs,
    ) -> HandlerResult {
        let target = args.first("target").unwrap_or_default();
        responder.send_privmsg(target, args.get("text").join(" "));
        Ok(())
    }

    fn command_fail(
        &self,
        responder: &Responder<Self>,
        msg: &Message,
        _args: &CommandArgs,
    ) -> HandlerResult {
        responder.respond(msg, "partial", false)?;
        Err("boom".into())
    }
}

impl Module for Echo {
    fn config_location(&self) -> Option<(&str, &str)> {
        Some(("fun", "echo"))
    }

    fn default_config(&self) -> Value {
        json!({ "command_prefix": "$", "greeting": "hello" })
    }

    fn ignore_help(&self) -> bool {
        !self.show_help
    }

    fn commands(&self) -> Vec<Command<Self>> {
        vec![
            Command::new("echo", Self::command_echo),
            Command::new("say", Self::command_say)
                .description("Sends TEXT to TARGET.\n\n    Syntax: say TARGET TEXT")
                .args(
                    ArgSpec::new()
                        .arg("target", Arity::Exactly(1))
                        .arg("text", Arity::OneOrMore),
                )
                .launch_invalid(false),
            Command::new("fail", Self::command_fail),
        ]
    }

    fn handle_msg(&self, _responder: &Responder<Self>, _msg: &Message) -> HandlerResult {
        self.general.fetch_add(1, Ordering::SeqCst);
        if self.fail_general {
            return Err("general failure".into());
        }
        Ok(())
    }

    fn handle_privmsg(&self, _responder: &Responder<Self>, _msg: &Message) -> HandlerResult {
        self.privmsgs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
