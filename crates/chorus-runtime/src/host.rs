//! The module host: feeds inbound messages to every registered module.
//!
//! ```rust,ignore
//! let (bus, mut events) = ChannelBus::new();
//! let mut host = ModuleHost::new(config.config_store(), Arc::new(bus));
//! host.register(Echo::default())?;
//!
//! let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//! host.run(rx).await;
//! ```
//!
//! Modules see each message in registration order, one message at a time.
//! A failing module does not stop the others: its error has already been
//! reported on the bus, and the host only logs it and moves on.

use std::future::Future;
use std::sync::Arc;

use chorus_core::{EventBus, Message, error_chain};
use chorus_framework::{ConfigStore, MessageSink, Module, Responder};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{Level, debug, error, info, span, warn};

use crate::error::{RuntimeError, RuntimeResult};

/// Counters returned when the host loop ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    /// Messages taken off the inbound channel.
    pub messages: usize,
    /// Module dispatches that returned an error.
    pub failures: usize,
}

/// Owns the registered modules and drives dispatch.
pub struct ModuleHost {
    store: ConfigStore,
    bus: Arc<dyn EventBus>,
    sinks: Vec<Box<dyn MessageSink>>,
}

impl ModuleHost {
    /// Creates a host whose modules share `store` and `bus`.
    pub fn new(store: ConfigStore, bus: Arc<dyn EventBus>) -> Self {
        Self {
            store,
            bus,
            sinks: Vec::new(),
        }
    }

    /// Returns the shared configuration store.
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Wraps `module` in a [`Responder`] and registers it.
    pub fn register<M: Module>(&mut self, module: M) -> RuntimeResult<()> {
        let responder = Responder::new(module, self.store.clone(), Arc::clone(&self.bus));
        self.register_sink(Box::new(responder))
    }

    /// Registers an already built sink.
    ///
    /// Module names must be unique, since bus events are keyed by them.
    pub fn register_sink(&mut self, sink: Box<dyn MessageSink>) -> RuntimeResult<()> {
        let name = sink.module_name();
        if self.sinks.iter().any(|s| s.module_name() == name) {
            return Err(RuntimeError::ModuleExists(name.to_string()));
        }
        info!(module = name, "Registered module");
        self.sinks.push(sink);
        Ok(())
    }

    /// Names of the registered modules, in dispatch order.
    pub fn module_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.module_name()).collect()
    }

    /// Hands `msg` to every module. Returns the number of modules that failed.
    pub fn dispatch(&self, msg: &Message) -> usize {
        let span = span!(Level::DEBUG, "host", command = %msg.command);
        let _enter = span.enter();

        let mut failures = 0;
        for sink in &self.sinks {
            if let Err(err) = sink.on_message_in(msg) {
                warn!(
                    module = sink.module_name(),
                    error = %error_chain(&err),
                    "Module failed, continuing"
                );
                failures += 1;
            }
        }
        failures
    }

    /// Runs until the inbound channel closes or Ctrl+C is received.
    pub async fn run(&self, inbound: mpsc::UnboundedReceiver<Message>) -> HostStats {
        self.run_until(inbound, ctrl_c()).await
    }

    /// Runs until the inbound channel closes or `shutdown` completes.
    pub async fn run_until<F>(
        &self,
        mut inbound: mpsc::UnboundedReceiver<Message>,
        shutdown: F,
    ) -> HostStats
    where
        F: Future<Output = ()>,
    {
        info!(modules = ?self.module_names(), "Module host running");
        tokio::pin!(shutdown);

        let mut stats = HostStats::default();
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested");
                    break;
                }
                next = inbound.recv() => match next {
                    Some(msg) => {
                        stats.messages += 1;
                        stats.failures += self.dispatch(&msg);
                    }
                    None => {
                        debug!("Inbound channel closed");
                        break;
                    }
                },
            }
        }

        info!(
            messages = stats.messages,
            failures = stats.failures,
            "Module host stopped"
        );
        stats
    }
}

async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chorus_core::NullBus;
    use chorus_framework::{Command, CommandArgs, HandlerResult};
    use serde_json::json;

    use super::*;
    use crate::bus::{BusEvent, ChannelBus};

    #[derive(Default)]
    struct Pong;

    impl Pong {
        fn command_ping(
            &self,
            responder: &Responder<Self>,
            msg: &Message,
            _args: &CommandArgs,
        ) -> HandlerResult {
            responder.respond(msg, "pong", false)?;
            Ok(())
        }
    }

    impl Module for Pong {
        fn commands(&self) -> Vec<Command<Self>> {
            vec![Command::new("ping", Self::command_ping)]
        }
    }

    struct Broken {
        calls: Arc<AtomicUsize>,
    }

    impl Module for Broken {
        fn handle_msg(&self, _responder: &Responder<Self>, _msg: &Message) -> HandlerResult {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err("broken".into())
        }
    }

    fn ping(text: &str) -> Message {
        Message::privmsg("#rust", text).with_nickname("alice")
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let mut host = ModuleHost::new(ConfigStore::new(), Arc::new(NullBus));
        host.register(Pong).unwrap();
        let err = host.register(Pong).unwrap_err();
        assert!(matches!(err, RuntimeError::ModuleExists(name) if name == "Pong"));
        assert_eq!(host.module_names(), vec!["Pong"]);
    }

    #[tokio::test]
    async fn test_run_until_channel_closes() {
        let (bus, mut events) = ChannelBus::new();
        let mut host = ModuleHost::new(ConfigStore::new(), Arc::new(bus));
        host.register(Pong).unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ping(".ping")).unwrap();
        tx.send(ping("no command here")).unwrap();
        drop(tx);

        let stats = host.run_until(rx, std::future::pending()).await;
        assert_eq!(
            stats,
            HostStats {
                messages: 2,
                failures: 0
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            BusEvent::MessageOut {
                module: "Pong".into(),
                message: Message::privmsg("#rust", "pong"),
            }
        );
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failing_module_does_not_stop_others() {
        let (bus, mut events) = ChannelBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut host = ModuleHost::new(ConfigStore::new(), Arc::new(bus));
        host.register(Broken {
            calls: Arc::clone(&calls),
        })
        .unwrap();
        host.register(Pong).unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(ping(".ping")).unwrap();
        tx.send(ping(".ping")).unwrap();
        drop(tx);

        let stats = host.run(rx).await;
        assert_eq!(stats.failures, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        let mut outbound = 0;
        let mut errors = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                BusEvent::MessageOut { module, .. } => {
                    assert_eq!(module, "Pong");
                    outbound += 1;
                }
                BusEvent::Exception { module, error } => {
                    assert_eq!(module, "Broken");
                    assert_eq!(error, "module 'Broken' failed in the general stage: broken");
                    errors += 1;
                }
            }
        }
        assert_eq!((outbound, errors), (2, 2));
    }

    #[tokio::test]
    async fn test_shutdown_future_stops_loop() {
        let host = ModuleHost::new(ConfigStore::new(), Arc::new(NullBus));
        let (_tx, rx) = mpsc::unbounded_channel::<Message>();
        let stats = host.run_until(rx, async {}).await;
        assert_eq!(stats, HostStats::default());
    }

    #[tokio::test]
    async fn test_modules_share_store() {
        let store = ConfigStore::from_value(json!({
            "chorus": { "base_responder": { "command_prefix": "!" } },
        }));
        let (bus, mut events) = ChannelBus::new();
        let mut host = ModuleHost::new(store, Arc::new(bus));
        host.register(Pong).unwrap();

        assert_eq!(host.dispatch(&ping(".ping")), 0);
        assert!(events.try_recv().is_err());

        assert_eq!(host.dispatch(&ping("!ping")), 0);
        assert!(matches!(events.try_recv(), Ok(BusEvent::MessageOut { .. })));
        assert_eq!(
            host.store().get_for_module("chorus", "base_responder"),
            Some(json!({ "command_prefix": "!" }))
        );
    }
}
