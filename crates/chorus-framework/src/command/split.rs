/// Shell-like splitting of a command payload.
///
/// Handles:
/// - Whitespace-separated arguments
/// - Quoted strings (single and double quotes)
/// - Backslash escapes inside double quotes
///
/// An unterminated quote swallows the rest of the input into the last
/// argument.
pub fn shell_split(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;
    let mut escape_next = false;
    let mut quoted = false;

    for ch in input.chars() {
        if escape_next {
            current.push(ch);
            escape_next = false;
            continue;
        }

        match ch {
            '\\' if in_double_quote => {
                escape_next = true;
            }
            '\'' if !in_double_quote => {
                in_single_quote = !in_single_quote;
                quoted = true;
            }
            '"' if !in_single_quote => {
                in_double_quote = !in_double_quote;
                quoted = true;
            }
            c if c.is_whitespace() && !in_single_quote && !in_double_quote => {
                if !current.is_empty() || quoted {
                    args.push(std::mem::take(&mut current));
                }
                quoted = false;
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words() {
        assert_eq!(shell_split("#rust hello\tworld"), ["#rust", "hello", "world"]);
    }

    #[test]
    fn test_quotes_group_words() {
        assert_eq!(
            shell_split(r#"alice "see you" 'at 5'"#),
            ["alice", "see you", "at 5"]
        );
        assert_eq!(shell_split(r#""it's" 'say "hi"'"#), ["it's", r#"say "hi""#]);
    }

    #[test]
    fn test_backslash_only_escapes_in_double_quotes() {
        assert_eq!(shell_split(r#""a \"b\"""#), [r#"a "b""#]);
        assert_eq!(shell_split(r"C:\dir"), [r"C:\dir"]);
    }

    #[test]
    fn test_empty_quotes_are_an_argument() {
        assert_eq!(shell_split(r#"topic """#), ["topic", ""]);
        assert_eq!(shell_split("''"), [""]);
    }

    #[test]
    fn test_unterminated_quote_takes_the_rest() {
        assert_eq!(shell_split("say 'hello there"), ["say", "hello there"]);
    }

    #[test]
    fn test_blank_input() {
        assert!(shell_split("").is_empty());
        assert!(shell_split("  \t ").is_empty());
    }
}
