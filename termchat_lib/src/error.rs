use thiserror::Error as ThisError;

/// Library errors.
#[derive(ThisError, Debug)]
pub enum Error {
    /// Missing arguments.
    #[error("Missing mandatory arguments: {0}\nTry `termchat --help` for more information.")]
    MissingArgError(&'static str),

    /// LLM call error.
    #[error("Failed to call LLM: {0}")]
    LLMCallError(#[from] reqwest::Error),

    /// LLM call error.
    #[error("Failed to process LLM call: {0}")]
    LLMJsonError(#[from] serde_json::Error),

    /// LLM call error.
    #[error("Failed to parse LLM response: {0}")]
    LLMResponseError(&'static str),

    /// Reading the response stream failed.
    #[error("Failed to read LLM response stream: {0}")]
    StreamError(#[from] std::io::Error),

    /// General error.
    #[error("{0}")]
    Error(String),

    /// LLM response error message.
    #[error("LLM provider responded with error: {0}")]
    LLMErrorMessage(String),

    /// Saved conversation could not be written or read.
    #[error("Conversation file {path}: {reason}")]
    ConversationError {
        /// File path.
        path: String,
        /// What went wrong.
        reason: String,
    },
}
