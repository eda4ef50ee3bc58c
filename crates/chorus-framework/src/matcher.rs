//! Command matching.
//!
//! Decides whether a message is a command invocation and which command it
//! names. Nothing is cached: the command name is derived from the payload on
//! every call.

use chorus_core::Message;

/// Returns the first whitespace-delimited token of `payload`.
pub fn first_token(payload: &str) -> Option<&str> {
    payload.split_whitespace().next()
}

/// Checks whether `msg` invokes a command.
///
/// - Without `command_name`: the payload starts with `prefix`.
/// - With `command_name`: the first token is exactly `prefix` followed by
///   `command_name` (case-sensitive).
///
/// Messages without parameters never match.
pub fn is_command(msg: &Message, prefix: &str, command_name: Option<&str>) -> bool {
    let Some(payload) = msg.payload() else {
        return false;
    };
    match command_name {
        Some(name) => first_token(payload)
            .and_then(|token| token.strip_prefix(prefix))
            .is_some_and(|rest| rest == name),
        None => payload.starts_with(prefix),
    }
}

/// Extracts the command name from the first token of the payload.
///
/// Every leading and trailing character that occurs anywhere in `prefix` is
/// stripped: with prefix `"!?"` the token `"?!help!"` yields `"help"`.
pub fn extract_command_name<'a>(msg: &'a Message, prefix: &str) -> Option<&'a str> {
    let token = first_token(msg.payload()?)?;
    Some(token.trim_matches(|c: char| prefix.contains(c)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn privmsg(text: &str) -> Message {
        Message::privmsg("#rust", text).with_nickname("alice")
    }

    #[test]
    fn test_prefix_only() {
        assert!(is_command(&privmsg(".echo hi"), ".", None));
        assert!(is_command(&privmsg("."), ".", None));
        assert!(!is_command(&privmsg("echo hi"), ".", None));
        assert!(!is_command(&privmsg(" .echo"), ".", None));
    }

    #[test]
    fn test_named_command_requires_exact_token() {
        assert!(is_command(&privmsg(".help me"), ".", Some("help")));
        assert!(is_command(&privmsg(".help"), ".", Some("help")));
        assert!(!is_command(&privmsg(".helpme"), ".", Some("help")));
        assert!(!is_command(&privmsg(".Help"), ".", Some("help")));
        assert!(!is_command(&privmsg("help"), ".", Some("help")));
    }

    #[test]
    fn test_prefix_override() {
        assert!(is_command(&privmsg("!echo"), "!", Some("echo")));
        assert!(!is_command(&privmsg(".echo"), "!", Some("echo")));
    }

    #[test]
    fn test_no_payload() {
        let msg = Message::new("PRIVMSG", Vec::<String>::new());
        assert!(!is_command(&msg, ".", None));
        assert!(!is_command(&msg, ".", Some("help")));
        assert_eq!(extract_command_name(&msg, "."), None);
        assert_eq!(extract_command_name(&privmsg("   "), "."), None);
    }

    #[test]
    fn test_extract_command_name() {
        assert_eq!(extract_command_name(&privmsg(".help me"), "."), Some("help"));
        assert_eq!(extract_command_name(&privmsg(".echo"), "."), Some("echo"));
        assert_eq!(extract_command_name(&privmsg("."), "."), Some(""));
    }

    #[test]
    fn test_extract_strips_prefix_characters_from_both_ends() {
        assert_eq!(extract_command_name(&privmsg("?!help! x"), "!?"), Some("help"));
        assert_eq!(extract_command_name(&privmsg("..echo.."), "."), Some("echo"));
        assert_eq!(extract_command_name(&privmsg("abhelpba"), "ab"), Some("help"));
        assert_eq!(extract_command_name(&privmsg("abba"), "ab"), Some(""));
    }
}
