//! The event bus seen from a module.
//!
//! Modules never deliver messages themselves. Every outbound message and every
//! error escaping the dispatch pipeline goes through an [`EventBus`] injected
//! at construction; the bus decides what happens next (writing to a socket,
//! logging, stopping the process...).

use std::error::Error;

use tracing::trace;

use crate::message::Message;

/// Boxed error type returned by handlers.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// Outbound and error channels of the event bus.
pub trait EventBus: Send + Sync {
    /// Emits a message produced by `module` on the outbound channel.
    fn message_out(&self, module: &str, msg: Message);

    /// Reports an error raised while `module` was processing a message.
    ///
    /// Called before the error is returned to whoever delivered the message.
    fn on_exception(&self, module: &str, error: &(dyn Error + Send + Sync + 'static));
}

/// Renders an error followed by each of its sources, joined by `: `.
pub fn error_chain(error: &(dyn Error + 'static)) -> String {
    let mut out = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// A bus that drops everything it receives.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBus;

impl EventBus for NullBus {
    fn message_out(&self, module: &str, msg: Message) {
        trace!(module, line = %msg, "NullBus dropped outbound message");
    }

    fn on_exception(&self, module: &str, error: &(dyn Error + Send + Sync + 'static)) {
        trace!(module, error = %error_chain(error), "NullBus dropped error");
    }
}
