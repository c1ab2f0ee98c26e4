use std::fmt::Display;
use serde_json::Value;


/// Logical roles (provider-independent).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Role {
    /// Model.
    Model,
    /// User.
    User,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let role = match self {
            Role::Model => "assistant",
            Role::User => "user",
        };
        f.write_str(role)
    }
}

/// Piece of a response, delivered while it streams in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta<'a> {
    /// Visible answer text.
    Text(&'a str),
    /// Extended thinking text.
    Thinking(&'a str),
}

/// Chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Text message.
    Text(Text),
    /// Tool call.
    ToolCall(ToolCall),
    /// Tool call result.
    ToolResult(ToolResult),
}

impl Message {
    /// Create text message.
    pub fn text(role: Role, message: String) -> Self {
        Message::Text(Text {role, message})
    }

    /// Role the message is sent with.
    pub fn role(&self) -> Role {
        match self {
            Message::Text(text) => text.role,
            Message::ToolCall(_) => Role::Model,
            Message::ToolResult(_) => Role::User,
        }
    }
}

/// Chat message.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    /// Role.
    pub role: Role,
    /// Message content.
    pub message: String,
}

/// Tool call result.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToolResult {
    /// Call id.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Text output.
    pub output: Option<String>,
    /// Error text. When set, the call failed.
    pub error: Option<String>,
    /// PNG screenshot, base64 encoded.
    pub base64_image: Option<String>,
}

impl ToolResult {
    /// Whether the call failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Tool use request.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Call id.
    pub call_id: String,
    /// Tool name.
    pub name: String,
    /// Call input as sent by the model.
    pub input: Value,
}
