//! Execution of the model's tool calls.
mod host;

pub use host::ExternalToolHost;
pub use host::ToolHost;
pub use host::ToolOutput;
pub use host::UnavailableToolHost;
