//! The `s/old/new/` corrector.
//!
//! [`Sed`] remembers what people say in channels. When someone sends a line
//! of the form `[nick: ]s/old/new/[flags]`, the newest remembered message by
//! `nick` (the sender if omitted) containing `old` is rewritten and announced:
//!
//! ```text
//! <alice> hello wrold
//! <alice> s/wrold/world/
//! <bot>   alice meant to say: hello world
//! <bob>   alice: s/hello/goodbye/
//! <bot>   bob thinks alice meant to say: goodbye wrold
//! ```
//!
//! Only the first occurrence is replaced unless the `g` flag is given.
//! Corrections themselves are not remembered.
//!
//! Configuration lives in `chorus.sed`:
//!
//! ```toml
//! [module_config.chorus.sed]
//! message_limit = 100                        # per channel
//! message_data = "/var/lib/chorus/sed.json"  # optional, in memory otherwise
//! ```

use std::collections::{HashMap, VecDeque};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chorus_core::{Message, is_channel_name};
use parking_lot::Mutex;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::command::HandlerResult;
use crate::error::ConfigResult;
use crate::module::Module;
use crate::responder::Responder;

/// Messages kept per channel when `message_limit` is not configured.
pub const DEFAULT_MESSAGE_LIMIT: usize = 100;

const MESSAGE_LIMIT_KEY: &str = "message_limit";
const MESSAGE_DATA_KEY: &str = "message_data";

const CORRECTION_PATTERN: &str = r"^([^:, ]*)[:, ]*s/([^/]*)/([^/]*)(/|/[a-z]+)?$";

/// A remembered channel message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Nickname of the sender.
    pub author: String,
    /// The message text.
    pub message: String,
}

/// Recent messages per channel, newest first.
///
/// With a backing file every change is written out as JSON; write failures
/// are logged and the in-memory copy stays authoritative.
#[derive(Debug, Default)]
pub struct MessageStore {
    path: Option<PathBuf>,
    channels: Mutex<HashMap<String, VecDeque<StoredMessage>>>,
}

impl MessageStore {
    /// Opens a store backed by `path`, loading it if the file exists.
    ///
    /// An unreadable or malformed file is logged and replaced by an empty
    /// store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let channels = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring malformed message data");
                HashMap::new()
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read message data");
                HashMap::new()
            }
        };
        debug!(path = %path.display(), channels = channels.len(), "Opened message store");
        Self {
            path: Some(path),
            channels: Mutex::new(channels),
        }
    }

    /// Remembers `message`, keeping at most `limit` messages for `channel`.
    pub fn add_message(&self, channel: &str, author: &str, message: &str, limit: usize) {
        let mut channels = self.channels.lock();
        let stored = channels.entry(channel.to_string()).or_default();
        stored.push_front(StoredMessage {
            author: author.to_string(),
            message: message.to_string(),
        });
        stored.truncate(limit);

        if let Some(path) = &self.path
            && let Err(e) = save(path, &channels)
        {
            warn!(path = %path.display(), error = %e, "Failed to save message data");
        }
    }

    /// Returns the messages remembered for `channel`, newest first.
    pub fn get_messages(&self, channel: &str) -> Vec<StoredMessage> {
        self.channels
            .lock()
            .get(channel)
            .map(|stored| stored.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn save(path: &Path, channels: &HashMap<String, VecDeque<StoredMessage>>) -> io::Result<()> {
    let bytes = serde_json::to_vec(channels).map_err(io::Error::other)?;
    fs::write(path, bytes)
}

/// A parsed `[nick: ]s/old/new/[flags]` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// Whose message to correct; the sender when `None`.
    pub nick: Option<String>,
    /// Text to look for.
    pub old: String,
    /// Replacement text.
    pub new: String,
    /// Replace every occurrence (`g` flag) rather than the first.
    pub global: bool,
}

impl Correction {
    /// Rewrites the first message in `messages` written by `nick` that
    /// contains the text to replace.
    pub fn apply<'a>(
        &self,
        messages: impl IntoIterator<Item = &'a StoredMessage>,
        nick: &str,
    ) -> Option<String> {
        let found = messages
            .into_iter()
            .find(|stored| stored.author == nick && stored.message.contains(self.old.as_str()))?;
        Some(if self.global {
            found.message.replace(&self.old, &self.new)
        } else {
            found.message.replacen(&self.old, &self.new, 1)
        })
    }
}

/// Corrects earlier channel messages on request.
pub struct Sed {
    pattern: Regex,
    store: OnceLock<MessageStore>,
}

impl Sed {
    /// Creates the module. The message store is opened on first use, from
    /// `message_data` if configured.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(CORRECTION_PATTERN)?,
            store: OnceLock::new(),
        })
    }

    /// Creates the module around an existing store.
    pub fn with_store(store: MessageStore) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(CORRECTION_PATTERN)?,
            store: OnceLock::from(store),
        })
    }

    /// Parses a correction request, or returns `None` for ordinary text.
    pub fn parse_correction(&self, text: &str) -> Option<Correction> {
        let caps = self.pattern.captures(text)?;
        let group = |i: usize| caps.get(i).map_or("", |m| m.as_str());
        Some(Correction {
            nick: Some(group(1)).filter(|nick| !nick.is_empty()).map(str::to_string),
            old: group(2).to_string(),
            new: group(3).to_string(),
            global: group(4).contains('g'),
        })
    }

    fn store(&self, responder: &Responder<Self>) -> ConfigResult<&MessageStore> {
        if let Some(store) = self.store.get() {
            return Ok(store);
        }
        let path: Option<PathBuf> = responder.config().get_or(MESSAGE_DATA_KEY, None)?;
        Ok(self.store.get_or_init(|| match path {
            Some(path) => MessageStore::open(path),
            None => MessageStore::default(),
        }))
    }
}

impl Module for Sed {
    fn config_location(&self) -> Option<(&str, &str)> {
        Some(("chorus", "sed"))
    }

    fn handle_privmsg(&self, responder: &Responder<Self>, msg: &Message) -> HandlerResult {
        let (Some(channel), Some(sender)) = (msg.target(), msg.nickname()) else {
            return Ok(());
        };
        if !is_channel_name(channel) {
            return Ok(());
        }
        let text = msg.params[1..].join(" ");
        let store = self.store(responder)?;

        let Some(correction) = self.parse_correction(&text) else {
            let limit = responder
                .config()
                .get_or(MESSAGE_LIMIT_KEY, DEFAULT_MESSAGE_LIMIT)?;
            store.add_message(channel, sender, &text, limit);
            return Ok(());
        };

        let nick = correction.nick.as_deref().unwrap_or(sender);
        let Some(fixed) = correction.apply(&store.get_messages(channel), nick) else {
            trace!(channel, nick, "Nothing to correct");
            return Ok(());
        };
        let reply = if nick == sender {
            format!("{nick} meant to say: {fixed}")
        } else {
            format!("{sender} thinks {nick} meant to say: {fixed}")
        };
        responder.respond(msg, reply, false)?;
        Ok(())
    }
}
