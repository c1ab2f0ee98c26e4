//! Session commands typed at the prompt.

/// Command entered by the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    /// Leave the session.
    Exit,
    /// Forget the conversation.
    Clear,
    /// Show the command list.
    Help,
    /// Write the conversation to a file.
    Save(Option<String>),
    /// Replace the conversation with a file's content.
    Load(Option<String>),
    /// Anything else starting with `/`.
    Unknown(String),
}

impl SessionCommand {

    /// Parse a trimmed input line, `None` when it is a chat message.
    pub fn parse(line: &str) -> Option<Self> {
        if !line.starts_with('/') {
            return None;
        }

        let mut parts = line.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default();
        let arg = parts.next()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned);

        Some(match name.to_lowercase().as_str() {
            "/exit" => SessionCommand::Exit,
            "/clear" => SessionCommand::Clear,
            "/help" => SessionCommand::Help,
            "/save" => SessionCommand::Save(arg),
            "/load" => SessionCommand::Load(arg),
            _ => SessionCommand::Unknown(name.to_owned()),
        })
    }
}
