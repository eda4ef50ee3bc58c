//! The per-message dispatch pipeline.
//!
//! Every inbound message goes through three stages, in order:
//!
//! 1. **General**: [`Module::handle_msg`], for every message
//! 2. **Privmsg**: [`Module::handle_privmsg`], for `PRIVMSG` only
//! 3. **Command**: for a `PRIVMSG` whose payload starts with the command
//!    prefix, the registered handler named by the first token
//!
//! ```text
//! message ──▶ handle_msg ──▶ PRIVMSG? ──▶ handle_privmsg ──▶ prefixed? ──▶ lookup ──▶ handler
//!                              │ no                            │ no          │ miss
//!                              ▼                               ▼             ▼
//!                             done                            done          done
//! ```
//!
//! The first error aborts the remaining stages and is returned as a
//! [`DispatchError`]. Unknown command names are not errors.

use chorus_core::{BoxError, Message};
use tracing::{Level, debug, span, trace};

use crate::command::args::split_rest;
use crate::command::{CommandArgs, parse_args};
use crate::error::{DispatchError, Stage};
use crate::matcher;
use crate::module::Module;
use crate::responder::Responder;

/// Runs all stages for one message.
pub(crate) fn dispatch<M: Module>(
    responder: &Responder<M>,
    msg: &Message,
) -> Result<(), DispatchError> {
    let span = span!(Level::DEBUG, "dispatch", module = responder.name(), command = %msg.command);
    let _enter = span.enter();
    let module = responder.module();

    trace!("Running general stage");
    module
        .handle_msg(responder, msg)
        .map_err(|e| DispatchError::new(responder.name(), Stage::General, e))?;

    if !msg.is_privmsg() {
        return Ok(());
    }

    trace!("Running privmsg stage");
    module
        .handle_privmsg(responder, msg)
        .map_err(|e| DispatchError::new(responder.name(), Stage::Privmsg, e))?;

    run_command(responder, msg)
}

fn run_command<M: Module>(responder: &Responder<M>, msg: &Message) -> Result<(), DispatchError> {
    let stage_error = |e: BoxError| DispatchError::new(responder.name(), Stage::Command, e);

    let prefix = responder
        .command_prefix()
        .map_err(|e| stage_error(e.into()))?;
    if !matcher::is_command(msg, &prefix, None) {
        return Ok(());
    }
    let Some(name) = matcher::extract_command_name(msg, &prefix) else {
        return Ok(());
    };
    let Some(command) = responder.registry().get_handler(name) else {
        trace!(command = name, "No handler for command");
        return Ok(());
    };

    let args = match parse_args(command.arg_spec(), name, msg) {
        Ok(args) => args,
        Err(err) if command.launches_invalid() => {
            debug!(command = name, error = %err, "Running command with invalid arguments");
            let (tokens, rest) = split_rest(msg);
            CommandArgs::invalid(tokens, rest, err)
        }
        Err(err) => {
            debug!(command = name, error = %err, "Skipping command with invalid arguments");
            return Ok(());
        }
    };

    debug!(command = name, "Running command handler");
    command
        .call(responder.module(), responder, msg, &args)
        .map_err(|e| stage_error(e).with_command(name))
}
