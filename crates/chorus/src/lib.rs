//! # Chorus
//!
//! A command-dispatch engine for reactive IRC-style chat modules.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐  inbound  ┌────────────┐     ┌─────────────────────────────────┐
//! │ Transport │──────────▶│ ModuleHost │────▶│ Responder<Echo>   general        │
//! └───────────┘           │            │────▶│ Responder<Seen>   ─▶ privmsg     │
//!       ▲                 └────────────┘     │ ...               ─▶ command     │
//!       │      outbound / errors             └────────────────┬────────────────┘
//!       └──────────────────── EventBus ◀──────────────────────┘
//! ```
//!
//! - **Core** (`chorus-core`): messages, channel-name rules, the bus trait
//! - **Framework** (`chorus-framework`): modules, config layering, commands, help
//! - **Runtime** (`chorus-runtime`): config files, logging, channel bus, host loop
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chorus::prelude::*;
//!
//! #[derive(Default)]
//! struct Echo;
//!
//! impl Echo {
//!     fn command_echo(&self, r: &Responder<Self>, msg: &Message, args: &CommandArgs) -> HandlerResult {
//!         r.respond(msg, args.rest(), false)?;
//!         Ok(())
//!     }
//! }
//!
//! impl Module for Echo {
//!     fn commands(&self) -> Vec<Command<Self>> {
//!         vec![Command::new("echo", Self::command_echo).description("Repeats TEXT.")]
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): TOML config files
//! - `yaml-config`: YAML config files
//! - `json-log`: JSON log output

pub use chorus_core as core;
pub use chorus_framework as framework;
pub use chorus_runtime as runtime;

/// Prelude module for convenient imports.
pub mod prelude {
    // Runtime
    pub use chorus_runtime::{BusEvent, ChannelBus, ChorusConfig, ConfigLoader, ModuleHost, logging};

    // Writing modules
    pub use chorus_framework::{
        ArgSpec, Arity, Command, CommandArgs, ConfigStore, HandlerResult, MessageSink, Module,
        Responder,
    };

    // Messages and the bus
    pub use chorus_core::{ChannelExt, EventBus, Message};
}
