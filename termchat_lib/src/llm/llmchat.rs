use serde_json::Value;
use crate::llm::anthropic::AnthropicChat;
use crate::config::Config;
use crate::error::Error;
use crate::request::Client;
use crate::tools::ToolGroup;
use super::{Delta, Message};

/// Chat with LLM with storing history.
pub trait LLMChat {

    /// Add input messages to the message history and stream the reply.
    /// Input messages contain a user message, or tool call results.
    /// Text and thinking are passed to `on_delta` as they arrive.
    /// Returns the reply's text messages and tool call requests.
    /// On error the history is left as it was before the call.
    fn get_inference(&mut self, messages: &[Message], on_delta: &mut dyn FnMut(Delta)) -> Result<Vec<Message>, Error>;

    /// Clear chat history.
    fn clear_history(&mut self);

    /// Update system prompt.
    fn set_system_prompt(&mut self, prompt: String);

    /// Raw API messages exchanged so far.
    fn history(&self) -> &[Value];

    /// Replace the history, e.g. with a loaded conversation.
    fn replace_history(&mut self, history: Vec<Value>);
}

/// Create LLMChat instance.
pub fn get_llm_chat(config: Config, client: Box<dyn Client>, tools: Option<ToolGroup>) -> Result<Box<dyn LLMChat>, Error> {
    Ok(Box::new(AnthropicChat::new(config, client, tools)?))
}
