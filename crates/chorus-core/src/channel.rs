//! Channel name utilities.
//!
//! A message target is either a channel (a group destination) or the nickname
//! of a single user. Responses are routed according to which of the two the
//! original message was sent to.

/// Characters that mark a target as a channel.
pub const CHANNEL_SIGILS: [char; 4] = ['#', '&', '+', '!'];

/// Returns `true` if `name` starts with one of the [`CHANNEL_SIGILS`].
pub fn is_channel_name(name: &str) -> bool {
    matches!(name.chars().next(), Some('#' | '&' | '+' | '!'))
}

/// Extension trait for checking if a string is a channel name.
pub trait ChannelExt {
    /// Check if this string names a channel rather than a user.
    fn is_channel_name(&self) -> bool;
}

impl ChannelExt for &str {
    fn is_channel_name(&self) -> bool {
        is_channel_name(self)
    }
}

impl ChannelExt for String {
    fn is_channel_name(&self) -> bool {
        is_channel_name(self)
    }
}
