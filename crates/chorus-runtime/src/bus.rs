//! An [`EventBus`] backed by a tokio channel.
//!
//! Outbound messages and reported errors become [`BusEvent`]s on one
//! unbounded channel, so a single consumer sees them in emission order.

use std::error::Error;

use chorus_core::{EventBus, Message, error_chain};
use tokio::sync::mpsc;
use tracing::warn;

/// Something a module pushed onto the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusEvent {
    /// A message for the outbound channel.
    MessageOut { module: String, message: Message },
    /// An error that escaped a module's dispatch pipeline.
    Exception { module: String, error: String },
}

impl BusEvent {
    /// Name of the module that emitted the event.
    pub fn module(&self) -> &str {
        match self {
            Self::MessageOut { module, .. } | Self::Exception { module, .. } => module,
        }
    }
}

/// Event bus forwarding everything to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelBus {
    tx: mpsc::UnboundedSender<BusEvent>,
}

impl ChannelBus {
    /// Creates a bus and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BusEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    fn send(&self, event: BusEvent) {
        if let Err(err) = self.tx.send(event) {
            warn!(module = err.0.module(), "Bus receiver dropped, event lost");
        }
    }
}

impl EventBus for ChannelBus {
    fn message_out(&self, module: &str, msg: Message) {
        self.send(BusEvent::MessageOut {
            module: module.to_string(),
            message: msg,
        });
    }

    fn on_exception(&self, module: &str, error: &(dyn Error + Send + Sync + 'static)) {
        self.send(BusEvent::Exception {
            module: module.to_string(),
            error: error_chain(error),
        });
    }
}
