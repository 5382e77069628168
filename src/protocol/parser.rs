//! Command parsing
//!
//! Turns one frame body into a [`Command`]. Commands are case-sensitive
//! lines of space-separated tokens; group member lists are comma-separated.

/// A command parsed from a client frame.
#[derive(Debug, PartialEq)]
pub enum Command {
    /// `create_client <name>` - the mandatory bootstrap command.
    CreateClient(String),
    /// `create_group <name> <m1,m2,...>`
    CreateGroup { name: String, members: Vec<String> },
    /// `who`
    Who,
    /// `send <target> <text...>` - target is a client or group name.
    Send { target: String, text: String },
    /// `exit`
    Exit,
    /// Anything that is not a well-formed command.
    Invalid(String),
}

/// Parse a raw frame body into a `Command`.
pub fn parse_command(raw: &str) -> Command {
    let mut parts = raw.splitn(3, ' ');
    let keyword = parts.next().unwrap_or("");

    match keyword {
        "create_client" => match parts.next() {
            Some(name) if !name.is_empty() => Command::CreateClient(name.to_string()),
            _ => Command::Invalid(raw.to_string()),
        },
        "create_group" => match (parts.next(), parts.next()) {
            (Some(name), Some(members)) if !name.is_empty() => Command::CreateGroup {
                name: name.to_string(),
                // Empty segments survive the split and fail member resolution
                // later, which is what aborts a malformed list.
                members: members.split(',').map(str::to_string).collect(),
            },
            _ => Command::Invalid(raw.to_string()),
        },
        "who" if parts.next().is_none() => Command::Who,
        "exit" if parts.next().is_none() => Command::Exit,
        "send" => match (parts.next(), parts.next()) {
            (Some(target), Some(text)) if !target.is_empty() => Command::Send {
                target: target.to_string(),
                text: text.to_string(),
            },
            _ => Command::Invalid(raw.to_string()),
        },
        _ => Command::Invalid(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create_client() {
        assert_eq!(
            parse_command("create_client Alice"),
            Command::CreateClient("Alice".to_string())
        );
        assert_eq!(
            parse_command("create_client"),
            Command::Invalid("create_client".to_string())
        );
    }

    #[test]
    fn test_parse_create_group() {
        assert_eq!(
            parse_command("create_group g1 Bob,carl"),
            Command::CreateGroup {
                name: "g1".to_string(),
                members: vec!["Bob".to_string(), "carl".to_string()],
            }
        );
        assert_eq!(
            parse_command("create_group g1"),
            Command::Invalid("create_group g1".to_string())
        );
    }

    #[test]
    fn test_parse_create_group_keeps_empty_segments() {
        assert_eq!(
            parse_command("create_group g1 Bob,,carl"),
            Command::CreateGroup {
                name: "g1".to_string(),
                members: vec!["Bob".to_string(), "".to_string(), "carl".to_string()],
            }
        );
    }

    #[test]
    fn test_parse_who_and_exit() {
        assert_eq!(parse_command("who"), Command::Who);
        assert_eq!(parse_command("exit"), Command::Exit);
        assert_eq!(parse_command("who now"), Command::Invalid("who now".to_string()));
    }

    #[test]
    fn test_parse_send_keeps_message_text_verbatim() {
        assert_eq!(
            parse_command("send Bob hello there  friend"),
            Command::Send {
                target: "Bob".to_string(),
                text: "hello there  friend".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_send_requires_target_and_text() {
        assert_eq!(parse_command("send Bob"), Command::Invalid("send Bob".to_string()));
        assert_eq!(parse_command("send"), Command::Invalid("send".to_string()));
    }

    #[test]
    fn test_commands_are_case_sensitive() {
        assert_eq!(parse_command("WHO"), Command::Invalid("WHO".to_string()));
        assert_eq!(parse_command(""), Command::Invalid("".to_string()));
    }
}
