//! LLM interface
mod llmchat;
mod anthropic;
mod caching;
mod stream;
mod util;
mod messages;

pub use llmchat::LLMChat;
pub use messages::Delta;
pub use messages::Message;
pub use messages::Role;
pub use messages::Text;
pub use messages::ToolCall;
pub use messages::ToolResult;
pub use llmchat::get_llm_chat;
