//! Command argument parsing.
//!
//! The text following the command token is shell-split and, when the command
//! declared an [`ArgSpec`], parsed with clap into named values:
//!
//! ```rust,ignore
//! let spec = ArgSpec::new()
//!     .arg("target", Arity::Exactly(1))
//!     .arg("text", Arity::OneOrMore);
//!
//! // ".say #rust hello there"
//! let args = parse_args(Some(&spec), "say", &msg)?;
//! assert_eq!(args.first("target"), Some("#rust"));
//! assert_eq!(args.get("text"), ["hello", "there"]);
//! ```
//!
//! Commands without a spec receive the raw tokens only.

use std::collections::BTreeMap;

use chorus_core::Message;
use clap::{Arg, ArgAction};

use super::split::shell_split;
use crate::error::ArgsError;

/// How many values a positional argument takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly `n` values (at least one). More than one must be the last
    /// argument.
    Exactly(usize),
    /// Zero or one value. No required argument may follow it.
    Optional,
    /// Any number of values. Must be the last argument.
    ZeroOrMore,
    /// At least one value. Must be the last argument.
    OneOrMore,
}

/// Ordered list of positional arguments a command accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgSpec {
    args: Vec<(String, Arity)>,
}

impl ArgSpec {
    /// Creates an empty spec, accepting no arguments at all.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, name: impl Into<String>, arity: Arity) -> Self {
        self.args.push((name.into(), arity));
        self
    }

    /// Iterates over the declared arguments in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Arity)> {
        self.args.iter().map(|(name, arity)| (name.as_str(), *arity))
    }

    /// Checks that the spec describes a layout the parser can handle.
    ///
    /// Names must be non-empty and unique, a required argument cannot follow
    /// an optional one, and only the last argument may take several values.
    /// Specs failing this check are refused at registration.
    pub fn validate(&self, command: &str) -> Result<(), ArgsError> {
        let invalid = |message: String| ArgsError {
            command: command.to_string(),
            message,
        };

        let mut optional: Option<&str> = None;
        for (index, (name, arity)) in self.iter().enumerate() {
            if name.is_empty() {
                return Err(invalid(format!("argument {index} has an empty name")));
            }
            if self.args[..index].iter().any(|(seen, _)| seen == name) {
                return Err(invalid(format!("argument '{name}' is declared twice")));
            }
            let required = matches!(arity, Arity::Exactly(_) | Arity::OneOrMore);
            if let (true, Some(before)) = (required, optional) {
                return Err(invalid(format!(
                    "required argument '{name}' follows optional argument '{before}'"
                )));
            }
            if !required {
                optional = Some(name);
            }
            let several = !matches!(arity, Arity::Exactly(0 | 1) | Arity::Optional);
            if several && index + 1 < self.args.len() {
                return Err(invalid(format!(
                    "argument '{name}' takes several values and must be last"
                )));
            }
        }
        Ok(())
    }

    fn to_clap(&self, command: &str) -> clap::Command {
        let mut cmd = clap::Command::new(command.to_string())
            .no_binary_name(true)
            .disable_help_flag(true)
            .disable_version_flag(true);

        for (name, arity) in self.iter() {
            let arg = Arg::new(name.to_string())
                .action(ArgAction::Set)
                .allow_hyphen_values(true);
            let arg = match arity {
                Arity::Exactly(n) => arg.num_args(n.max(1)).required(true),
                Arity::Optional => arg.num_args(1).required(false),
                Arity::ZeroOrMore => arg.num_args(1..).required(false),
                Arity::OneOrMore => arg.num_args(1..).required(true),
            };
            cmd = cmd.arg(arg);
        }
        cmd
    }
}

/// Arguments handed to a command handler.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandArgs {
    tokens: Vec<String>,
    rest: String,
    values: BTreeMap<String, Vec<String>>,
    error: Option<ArgsError>,
}

impl CommandArgs {
    /// Arguments whose parsing failed; only the raw text is available.
    pub fn invalid(tokens: Vec<String>, rest: impl Into<String>, error: ArgsError) -> Self {
        Self {
            tokens,
            rest: rest.into(),
            values: BTreeMap::new(),
            error: Some(error),
        }
    }

    /// Shell-split tokens following the command token.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Raw text following the command token.
    pub fn rest(&self) -> &str {
        &self.rest
    }

    /// Values of a named argument; empty when absent.
    pub fn get(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// First value of a named argument.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).first().map(String::as_str)
    }

    /// Returns `false` if the arguments did not match the declared spec.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// The parse error, for handlers run with invalid arguments.
    pub fn error(&self) -> Option<&ArgsError> {
        self.error.as_ref()
    }
}

/// Splits the text following the first payload token.
///
/// Returns the shell-split tokens and the raw remainder.
pub fn split_rest(msg: &Message) -> (Vec<String>, String) {
    let payload = msg.payload().unwrap_or_default().trim_start();
    let rest = payload
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim_start())
        .unwrap_or_default();
    (shell_split(rest), rest.to_string())
}

/// Parses the arguments of a command invocation.
///
/// Without a spec the tokens are passed through untouched. A spec failing
/// [`ArgSpec::validate`] yields an error for every message.
pub fn parse_args(
    spec: Option<&ArgSpec>,
    command: &str,
    msg: &Message,
) -> Result<CommandArgs, ArgsError> {
    let (tokens, rest) = split_rest(msg);
    let Some(spec) = spec else {
        return Ok(CommandArgs {
            tokens,
            rest,
            ..Default::default()
        });
    };

    spec.validate(command)?;
    let matches = spec
        .to_clap(command)
        .try_get_matches_from(&tokens)
        .map_err(|err| ArgsError {
            command: command.to_string(),
            message: first_line(&err.to_string()),
        })?;

    let mut values = BTreeMap::new();
    for (name, _) in spec.iter() {
        let found: Vec<String> = matches
            .get_many::<String>(name)
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default();
        values.insert(name.to_string(), found);
    }

    Ok(CommandArgs {
        tokens,
        rest,
        values,
        error: None,
    })
}

fn first_line(rendered: &str) -> String {
    let line = rendered.lines().next().unwrap_or_default();
    line.strip_prefix("error: ").unwrap_or(line).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn privmsg(text: &str) -> Message {
        Message::privmsg("#rust", text).with_nickname("alice")
    }

    #[test]
    fn test_without_spec_passes_tokens_through() {
        let args = parse_args(None, "echo", &privmsg(".echo hi")).unwrap();
        assert_eq!(args.rest(), "hi");
        assert_eq!(args.tokens(), ["hi"]);
        assert!(args.is_valid());
        assert!(args.get("anything").is_empty());
    }

    #[test]
    fn test_rest_keeps_inner_spacing() {
        let args = parse_args(None, "echo", &privmsg(".echo   a  'b c'")).unwrap();
        assert_eq!(args.rest(), "a  'b c'");
        assert_eq!(args.tokens(), ["a", "b c"]);
    }

    #[test]
    fn test_bare_command_has_no_rest() {
        let args = parse_args(None, "ping", &privmsg(".ping")).unwrap();
        assert_eq!(args.rest(), "");
        assert!(args.tokens().is_empty());
    }

    #[test]
    fn test_zero_or_more() {
        let spec = ArgSpec::new().arg("command_names", Arity::ZeroOrMore);

        let args = parse_args(Some(&spec), "help", &privmsg(".help")).unwrap();
        assert!(args.get("command_names").is_empty());

        let args = parse_args(Some(&spec), "help", &privmsg(".help echo ping")).unwrap();
        assert_eq!(args.get("command_names"), ["echo", "ping"]);
    }

    #[test]
    fn test_named_positionals() {
        let spec = ArgSpec::new()
            .arg("target", Arity::Exactly(1))
            .arg("text", Arity::OneOrMore);

        let args = parse_args(Some(&spec), "say", &privmsg(".say #rust hello there")).unwrap();
        assert_eq!(args.first("target"), Some("#rust"));
        assert_eq!(args.get("text"), ["hello", "there"]);
    }

    #[test]
    fn test_missing_required_argument() {
        let spec = ArgSpec::new().arg("text", Arity::OneOrMore);
        let err = parse_args(Some(&spec), "say", &privmsg(".say")).unwrap_err();
        assert_eq!(err.command, "say");
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_unexpected_argument() {
        let spec = ArgSpec::new().arg("name", Arity::Optional);
        assert!(parse_args(Some(&spec), "seen", &privmsg(".seen bob")).is_ok());
        assert!(parse_args(Some(&spec), "seen", &privmsg(".seen bob carol")).is_err());
    }

    #[test]
    fn test_validate_accepts_usual_layouts() {
        let specs = [
            ArgSpec::new(),
            ArgSpec::new().arg("command_names", Arity::ZeroOrMore),
            ArgSpec::new()
                .arg("target", Arity::Exactly(1))
                .arg("text", Arity::OneOrMore),
            ArgSpec::new()
                .arg("nick", Arity::Exactly(1))
                .arg("channel", Arity::Optional)
                .arg("more", Arity::Optional),
            ArgSpec::new().arg("pair", Arity::Exactly(2)),
        ];
        for spec in specs {
            assert_eq!(spec.validate("cmd"), Ok(()), "{spec:?}");
        }
    }

    #[test]
    fn test_validate_rejects_unparsable_layouts() {
        let specs = [
            ArgSpec::new()
                .arg("channel", Arity::Optional)
                .arg("nick", Arity::Exactly(1)),
            ArgSpec::new()
                .arg("names", Arity::ZeroOrMore)
                .arg("nick", Arity::Exactly(1)),
            ArgSpec::new()
                .arg("names", Arity::ZeroOrMore)
                .arg("flag", Arity::Optional),
            ArgSpec::new()
                .arg("pair", Arity::Exactly(2))
                .arg("nick", Arity::Exactly(1)),
            ArgSpec::new()
                .arg("nick", Arity::Exactly(1))
                .arg("nick", Arity::Optional),
            ArgSpec::new().arg("", Arity::Optional),
        ];
        for spec in specs {
            let err = spec.validate("seen").unwrap_err();
            assert_eq!(err.command, "seen");
        }
    }

    #[test]
    fn test_optional_before_required_is_an_error_not_a_panic() {
        let spec = ArgSpec::new()
            .arg("channel", Arity::Optional)
            .arg("nick", Arity::Exactly(1));
        let err = parse_args(Some(&spec), "seen", &privmsg(".seen bob")).unwrap_err();
        assert_eq!(
            err.message,
            "required argument 'nick' follows optional argument 'channel'"
        );

        let spec = ArgSpec::new()
            .arg("names", Arity::ZeroOrMore)
            .arg("nick", Arity::Exactly(1));
        assert!(parse_args(Some(&spec), "seen", &privmsg(".seen a b")).is_err());
    }

    #[test]
    fn test_invalid_args_keep_raw_text() {
        let error = ArgsError {
            command: "say".into(),
            message: "missing".into(),
        };
        let args = CommandArgs::invalid(vec!["x".into()], "x", error.clone());
        assert!(!args.is_valid());
        assert_eq!(args.error(), Some(&error));
        assert_eq!(args.rest(), "x");
    }
}
