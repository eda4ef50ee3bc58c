//! Echo Bot Example
//!
//! Reads raw IRC lines from stdin, runs them through an `Echo` module and
//! prints every outbound line to stdout. Logs go to stderr.
//!
//! # Commands
//!
//! - `.echo TEXT`: repeats TEXT where it was said
//! - `.ping`: replies with the configured `ping_reply`
//! - `.say TARGET TEXT`: sends TEXT to TARGET
//! - `.help [COMMAND...]`: describes commands, privately
//!
//! A [`Sed`] module runs alongside, so `s/old/new/` in a channel corrects the
//! sender's last message there.
//!
//! # Usage
//!
//! ```bash
//! echo ':alice!a@host PRIVMSG #rust :.echo hi' | cargo run --package echo-bot
//! cargo run --package echo-bot -- --prefix '!' --config chorus.toml
//! ```
//!
//! The module reads its own options from `module_config.demo.echo`:
//!
//! ```toml
//! [module_config.demo.echo]
//! ping_reply = "pong!"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chorus::core::ParseError;
use chorus::framework::builtin::Sed;
use chorus::prelude::*;
use clap::Parser;
use serde_json::{Value, json};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "echo-bot", version, about = "A line-based echo bot for Chorus")]
struct Cli {
    /// Configuration file to load instead of searching the default locations
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Command prefix shared by all modules
    #[arg(short, long)]
    prefix: Option<String>,
}

// ============================================================================
// Echo Module
// ============================================================================

#[derive(Default)]
struct Echo;

impl Echo {
    fn command_echo(
        &self,
        responder: &Responder<Self>,
        msg: &Message,
        args: &CommandArgs,
    ) -> HandlerResult {
        if !args.rest().is_empty() {
            responder.respond(msg, args.rest(), false)?;
        }
        Ok(())
    }

    fn command_ping(
        &self,
        responder: &Responder<Self>,
        msg: &Message,
        _args: &CommandArgs,
    ) -> HandlerResult {
        let reply = responder.config().get_str("ping_reply")?;
        responder.respond(msg, reply, false)?;
        Ok(())
    }

    fn command_say(
        &self,
        responder: &Responder<Self>,
        _msg: &Message,
        args: &CommandArgs,
    ) -> HandlerResult {
        if let Some(target) = args.first("target") {
            responder.send_privmsg(target, args.get("text").join(" "));
        }
        Ok(())
    }
}

impl Module for Echo {
    fn config_location(&self) -> Option<(&str, &str)> {
        Some(("demo", "echo"))
    }

    fn default_config(&self) -> Value {
        json!({ "ping_reply": "pong" })
    }

    fn commands(&self) -> Vec<Command<Self>> {
        vec![
            Command::new("echo", Self::command_echo)
                .description("Repeats TEXT where it was said. Syntax: echo TEXT"),
            Command::new("ping", Self::command_ping).description("Replies with a pong."),
            Command::new("say", Self::command_say)
                .description(
                    "Sends TEXT to TARGET, a channel or a nickname.
                     Syntax: say TARGET TEXT",
                )
                .args(
                    ArgSpec::new()
                        .arg("target", Arity::Exactly(1))
                        .arg("text", Arity::OneOrMore),
                )
                .launch_invalid(false),
        ]
    }

    fn handle_privmsg(&self, _responder: &Responder<Self>, msg: &Message) -> HandlerResult {
        info!(
            from = msg.nickname().unwrap_or("?"),
            to = msg.target().unwrap_or("?"),
            text = msg.payload().unwrap_or_default(),
            "PRIVMSG"
        );
        Ok(())
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.file(path);
    }
    if let Some(prefix) = &cli.prefix {
        loader = loader.set("module_config.chorus.base_responder.command_prefix", prefix);
    }
    let config = loader.load()?;
    logging::init_from_config(&config.logging);

    let (bus, mut events) = ChannelBus::new();
    let mut host = ModuleHost::new(config.config_store(), Arc::new(bus));
    host.register(Echo)?;
    host.register(Sed::new()?)?;

    let output = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                BusEvent::MessageOut { module, message } => match message.to_line() {
                    Ok(line) => println!("{line}"),
                    Err(e) => {
                        warn!(module = %module, error = %e, "Dropping unsendable message");
                    }
                },
                BusEvent::Exception { module, error } => {
                    error!(module = %module, error = %error, "Module raised an error");
                }
            }
        }
    });

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match Message::parse(&line) {
                    Ok(msg) => {
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(ParseError::Empty) => {}
                    Err(e) => warn!(error = %e, "Skipping unparsable line"),
                },
                Ok(None) => break,
                Err(e) => {
                    error!(error = %e, "Failed to read stdin");
                    break;
                }
            }
        }
    });

    let stats = host.run(rx).await;
    info!(messages = stats.messages, failures = stats.failures, "Done");

    // Dropping the host drops the last bus sender, which ends the output task.
    drop(host);
    output.await?;
    Ok(())
}
