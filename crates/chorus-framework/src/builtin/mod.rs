//! Modules shipped with the framework.

pub mod sed;

pub use sed::{Correction, MessageStore, Sed, StoredMessage};
