//! Termchat-lib talks to the Anthropic Messages API for a terminal chat client.
//! It streams replies, offers the computer-use tool set and keeps the conversation.
//!
//! ### Features
//!
//!  - streaming responses (server-sent events)
//!  - computer-use tool groups
//!  - prompt caching and extended thinking
//!  - conversation files
//!
//! ### Examples
//!
//! ```rust no_run
//! use termchat_lib::llm::{get_llm_chat, Delta, Message, Role};
//! use termchat_lib::request::get_reqwest_client;
//! use termchat_lib::tools::{Display, ToolGroup, ToolVersion};
//! use termchat_lib::Config;
//!
//! let config = Config::new("claude-3-7-sonnet-20250219".into(), "<api-key>".into());
//! let tools = ToolGroup::new(ToolVersion::ComputerUse20250124, Display::default());
//!
//! let reqwest_client = get_reqwest_client().expect("transport created");
//!
//! let mut chat = get_llm_chat(config, reqwest_client, Some(tools)).expect("chat created");
//!
//! chat.set_system_prompt("You are a helpful assistant.".into());
//!
//! let user_message = Message::text(Role::User, "Hi assistant!".into());
//!
//! let response = chat.get_inference(&[user_message], &mut |delta| {
//!     if let Delta::Text(text) = delta { print!("{text}"); }
//! }).expect("LLM response");
//!
//! for message in response.iter() {
//!     match message {
//!         Message::Text(_) => { /* already streamed */ }
//!         Message::ToolCall(tool_call) => { /* run the tool, reply with Message::ToolResult */ }
//!         Message::ToolResult(_) => { panic!("LLM must not respond with tool result!") }
//!     };
//! }
//! ```

#![deny(missing_docs)]
#![deny(clippy::suspicious)]
#![allow(clippy::comparison_chain)]
#![allow(clippy::collapsible_else_if)]
#![allow(clippy::collapsible_if)]

mod error;
mod config;
pub mod conversation;
pub mod llm;
pub mod tools;
pub mod request;

pub use error::Error;
pub use config::Config;
pub use config::{DEFAULT_API_URL, DEFAULT_API_VERSION, PROMPT_CACHING_BETA_FLAG};
