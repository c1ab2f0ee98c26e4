//! Conversation files.
//!
//! A conversation is stored as a JSON array of `{"role", "content"}` objects.
//! Structured content is written as its JSON encoding inside the string and
//! decoded again on load.

use std::fs;
use std::path::Path;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use crate::error::Error;

#[derive(Serialize)]
struct SavedMessage<'a> {
    role: &'a str,
    content: String,
}

fn file_error(path: &Path, reason: impl ToString) -> Error {
    Error::ConversationError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Encode history in the file format.
pub fn to_file_format(history: &[Value]) -> Result<String, Error> {
    let mut saved = Vec::with_capacity(history.len());

    for message in history {
        let role = message["role"]
            .as_str()
            .ok_or(Error::Error("message without a role in history".to_owned()))?;

        let content = match &message["content"] {
            Value::String(text) => text.clone(),
            other => serde_json::to_string(other)?,
        };

        saved.push(SavedMessage { role, content });
    }

    Ok(serde_json::to_string_pretty(&saved)?)
}

/// Decode history from the file format.
pub fn from_file_format(text: &str) -> Result<Vec<Value>, Error> {
    let loaded: Value = serde_json::from_str(text)?;
    let entries = loaded
        .as_array()
        .ok_or(Error::Error("conversation must be a JSON array".to_owned()))?;

    let mut history = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry["role"].as_str().is_none() || entry.get("content").is_none() {
            return Err(Error::Error("every message needs a role and content".to_owned()));
        }

        let mut message = entry.clone();
        if let Some(text) = entry["content"].as_str() {
            if text.starts_with('[') {
                // Plain text that merely starts with a bracket stays as it is.
                if let Ok(content) = serde_json::from_str::<Value>(text) {
                    message["content"] = content;
                }
            }
        }
        history.push(message);
    }

    Ok(history)
}

/// Write history to `path`.
pub fn save(path: &Path, history: &[Value]) -> Result<(), Error> {
    let text = to_file_format(history).map_err(|e| file_error(path, e))?;
    fs::write(path, text).map_err(|e| file_error(path, e))?;
    debug!(path = %path.display(), messages = history.len(), "conversation saved");
    Ok(())
}

/// Read history from `path`.
pub fn load(path: &Path) -> Result<Vec<Value>, Error> {
    let text = fs::read_to_string(path).map_err(|e| file_error(path, e))?;
    let history = from_file_format(&text).map_err(|e| file_error(path, e))?;
    debug!(path = %path.display(), messages = history.len(), "conversation loaded");
    Ok(history)
}
