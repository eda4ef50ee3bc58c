//! The protocol message value.
//!
//! A [`Message`] is what flows through the event bus in both directions. It
//! keeps only the parts of an IRC line the dispatch engine cares about: the
//! command verb, its ordered parameters and the nickname of the sender.
//!
//! ```text
//! :alice!alice@host PRIVMSG #rust :.echo hello world
//!  └─┬─┘            └──┬──┘ └─┬─┘  └───────┬───────┘
//! nickname          command  params[0]   params[1] (payload)
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EncodeError, ParseError, ParseResult};

/// The chat-send verb.
pub const PRIVMSG: &str = "PRIVMSG";

/// An immutable protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Protocol verb, e.g. `PRIVMSG`.
    pub command: String,

    /// Ordered parameters. For `PRIVMSG` the first is the target and the last
    /// is the free-text payload.
    #[serde(default)]
    pub params: Vec<String>,

    /// Nickname of the sender, absent for locally created messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl Message {
    /// Creates a message without a sender.
    pub fn new<I, S>(command: impl Into<String>, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            params: params.into_iter().map(Into::into).collect(),
            nickname: None,
        }
    }

    /// Creates a `PRIVMSG` addressed to `target`.
    pub fn privmsg(target: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(PRIVMSG, [target.into(), text.into()])
    }

    /// Sets the sender nickname.
    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }

    /// Returns the sender nickname, if any.
    pub fn nickname(&self) -> Option<&str> {
        self.nickname.as_deref()
    }

    /// Returns the first parameter (the target of a `PRIVMSG`).
    pub fn target(&self) -> Option<&str> {
        self.params.first().map(String::as_str)
    }

    /// Returns the last parameter (the free-text payload of a `PRIVMSG`).
    pub fn payload(&self) -> Option<&str> {
        self.params.last().map(String::as_str)
    }

    /// Returns `true` if this is a `PRIVMSG`.
    pub fn is_privmsg(&self) -> bool {
        self.command == PRIVMSG
    }

    /// Decodes a raw protocol line.
    ///
    /// Trailing `\r\n` is ignored. The nickname is taken from the prefix up to
    /// the first `!`.
    pub fn parse(line: &str) -> ParseResult<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        let mut rest = line;
        let mut nickname = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (prefix, tail) = stripped.split_once(' ').unwrap_or((stripped, ""));
            let nick = prefix.split('!').next().unwrap_or(prefix);
            if !nick.is_empty() {
                nickname = Some(nick.to_string());
            }
            rest = tail;
        }

        let (middle, trailing) = match rest.split_once(" :") {
            Some((middle, trailing)) => (middle, Some(trailing)),
            None => match rest.strip_prefix(':') {
                Some(trailing) => ("", Some(trailing)),
                None => (rest, None),
            },
        };

        let mut words = middle.split_whitespace();
        let command = words.next().ok_or_else(|| ParseError::MissingCommand {
            line: line.to_string(),
        })?;

        let mut params: Vec<String> = words.map(str::to_string).collect();
        if let Some(trailing) = trailing {
            params.push(trailing.to_string());
        }

        Ok(Self {
            command: command.to_string(),
            params,
            nickname,
        })
    }

    /// Checks that this message can be written as a single protocol line.
    ///
    /// Only the last parameter may be empty, contain spaces or start with
    /// `:`. No part may contain `\r` or `\n`.
    pub fn validate(&self) -> Result<(), EncodeError> {
        check_word("command", &self.command)?;
        if let Some(nick) = &self.nickname {
            check_word("nickname", nick)?;
        }
        let last = self.params.len().saturating_sub(1);
        for (index, param) in self.params.iter().enumerate() {
            if param.contains(['\r', '\n']) {
                return Err(EncodeError::LineBreak { index });
            }
            if index < last && (param.is_empty() || param.contains(' ') || param.starts_with(':'))
            {
                return Err(EncodeError::NotLast {
                    index,
                    param: param.clone(),
                });
            }
        }
        Ok(())
    }

    /// Encodes this message as a protocol line without the line terminator.
    ///
    /// Fails if the message would not survive the trip as one line; see
    /// [`validate`](Self::validate). The [`Display`](fmt::Display) impl
    /// writes the same text without checking and is meant for logs.
    pub fn to_line(&self) -> Result<String, EncodeError> {
        self.validate()?;
        Ok(self.to_string())
    }
}

fn check_word(part: &'static str, value: &str) -> Result<(), EncodeError> {
    if value.is_empty() || value.contains([' ', '\r', '\n']) {
        return Err(EncodeError::InvalidWord {
            part,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(nick) = &self.nickname {
            write!(f, ":{nick} ")?;
        }
        f.write_str(&self.command)?;

        let Some((last, middle)) = self.params.split_last() else {
            return Ok(());
        };
        for param in middle {
            write!(f, " {param}")?;
        }
        if last.is_empty() || last.contains(' ') || last.starts_with(':') {
            write!(f, " :{last}")
        } else {
            write!(f, " {last}")
        }
    }
}

impl std::str::FromStr for Message {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
