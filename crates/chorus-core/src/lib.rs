//! # Chorus Core
//!
//! Foundation types shared by every layer of the Chorus command-dispatch
//! engine:
//!
//! - [`Message`]: the immutable protocol message value, with an IRC line codec
//! - [`ChannelExt`] / [`is_channel_name`]: channel-vs-user target detection
//! - [`EventBus`]: the outbound and error channels a module talks to
//!
//! Nothing in this crate performs I/O. Transports and bus implementations live
//! in `chorus-runtime`; the dispatch pipeline lives in `chorus-framework`.

pub mod bus;
pub mod channel;
pub mod error;
pub mod message;

pub use bus::{BoxError, EventBus, NullBus, error_chain};
pub use channel::{ChannelExt, is_channel_name};
pub use error::{EncodeError, ParseError, ParseResult};
pub use message::{Message, PRIVMSG};

/// Prelude for common imports.
pub mod prelude {
    pub use super::{BoxError, ChannelExt, EventBus, Message, PRIVMSG, is_channel_name};
}
