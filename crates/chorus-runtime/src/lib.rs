//! # Chorus Runtime
//!
//! Everything around the dispatch engine that touches the outside world:
//!
//! - [`config`]: figment-based loading of `chorus.toml` and `CHORUS_*` variables
//! - [`logging`]: tracing subscriber setup driven by the `logging` section
//! - [`ChannelBus`]: an [`EventBus`](chorus_core::EventBus) on a tokio channel
//! - [`ModuleHost`]: owns the modules and feeds them inbound messages
//!
//! ```rust,ignore
//! use chorus_runtime::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     logging::init_from_config(&config.logging);
//!
//!     let (bus, mut events) = ChannelBus::new();
//!     let mut host = ModuleHost::new(config.config_store(), Arc::new(bus));
//!     host.register(Echo::default())?;
//!
//!     let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
//!     // ... feed `tx` from a transport, drain `events` into it ...
//!     host.run(rx).await;
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;

pub use bus::{BusEvent, ChannelBus};
pub use config::{ChorusConfig, ConfigError, ConfigLoader, ConfigResult, LoggingConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use host::{HostStats, ModuleHost};
pub use logging::{LoggingBuilder, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude for applications.
pub mod prelude {
    pub use super::logging;
    pub use super::{BusEvent, ChannelBus, ChorusConfig, ConfigLoader, ModuleHost};
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
