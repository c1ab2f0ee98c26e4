use serde_json::{json, Value};
use tracing::{debug, trace};
use crate::error::Error;
use crate::request::SseEvent;
use crate::val_as_str;
use super::Delta;

/// Message rebuilt from a finished stream.
#[derive(Debug)]
pub struct StreamedMessage {
    /// Role reported by `message_start`.
    pub role: String,
    /// Complete content blocks.
    pub content: Vec<Value>,
    /// Why generation stopped.
    pub stop_reason: Option<String>,
}

struct Block {
    value: Value,
    // text, thinking or tool input JSON received so far
    buffer: String,
}

/// Folds stream events into a message.
pub struct MessageAccumulator {
    role: String,
    blocks: Vec<Block>,
    stop_reason: Option<String>,
    done: bool,
}

impl MessageAccumulator {

    pub fn new() -> Self {
        MessageAccumulator {
            role: "assistant".to_owned(),
            blocks: vec![],
            stop_reason: None,
            done: false,
        }
    }

    /// Apply one event, forwarding text and thinking pieces to `on_delta`.
    pub fn apply(&mut self, event: &SseEvent, on_delta: &mut dyn FnMut(Delta)) -> Result<(), Error> {
        let body: Value = serde_json::from_str(&event.data)?;
        let kind = val_as_str!(body["type"], "event type");
        trace!(kind, "stream event");

        match kind {
            "message_start" => {
                if let Some(role) = body["message"]["role"].as_str() {
                    self.role = role.to_owned();
                }
            },
            "content_block_start" => {
                let index = block_index(&body)?;
                if index != self.blocks.len() {
                    return Err(Error::LLMResponseError("content block started out of order."));
                }

                let value = body["content_block"].clone();
                let buffer = match value["type"].as_str() {
                    Some("text") => value["text"].as_str().unwrap_or_default().to_owned(),
                    Some("thinking") => value["thinking"].as_str().unwrap_or_default().to_owned(),
                    _ => String::new(),
                };
                self.blocks.push(Block { value, buffer });
            },
            "content_block_delta" => {
                let index = block_index(&body)?;
                let block = self.blocks.get_mut(index)
                    .ok_or(Error::LLMResponseError("delta for unknown content block."))?;
                let delta = &body["delta"];

                match delta["type"].as_str() {
                    Some("text_delta") => {
                        let text = val_as_str!(delta["text"], "text delta");
                        block.buffer.push_str(text);
                        on_delta(Delta::Text(text));
                    },
                    Some("thinking_delta") => {
                        let thinking = val_as_str!(delta["thinking"], "thinking delta");
                        block.buffer.push_str(thinking);
                        on_delta(Delta::Thinking(thinking));
                    },
                    Some("input_json_delta") => {
                        block.buffer.push_str(val_as_str!(delta["partial_json"], "tool input delta"));
                    },
                    Some("signature_delta") => {
                        block.value["signature"] = delta["signature"].clone();
                    },
                    other => debug!(?other, "ignoring content delta"),
                }
            },
            "content_block_stop" => {
                let index = block_index(&body)?;
                let block = self.blocks.get_mut(index)
                    .ok_or(Error::LLMResponseError("stop for unknown content block."))?;
                block.close()?;
            },
            "message_delta" => {
                if let Some(reason) = body["delta"]["stop_reason"].as_str() {
                    self.stop_reason = Some(reason.to_owned());
                }
            },
            "message_stop" => {
                self.done = true;
            },
            "ping" => {},
            "error" => {
                let message = val_as_str!(body["error"]["message"], "error message").to_owned();
                return Err(Error::LLMErrorMessage(message));
            },
            other => debug!(other, "ignoring stream event"),
        }

        Ok(())
    }

    /// Complete message, an error if the stream stopped early.
    pub fn finish(self) -> Result<StreamedMessage, Error> {
        if !self.done {
            return Err(Error::LLMResponseError("stream ended before the message was complete."));
        }

        Ok(StreamedMessage {
            role: self.role,
            content: self.blocks.into_iter().map(|block| block.value).collect(),
            stop_reason: self.stop_reason,
        })
    }
}

impl Block {
    fn close(&mut self) -> Result<(), Error> {
        let buffer = std::mem::take(&mut self.buffer);

        match self.value["type"].as_str() {
            Some("text") => self.value["text"] = Value::String(buffer),
            Some("thinking") => self.value["thinking"] = Value::String(buffer),
            Some("tool_use") => {
                self.value["input"] = if buffer.trim().is_empty() {
                    json!({})
                } else {
                    serde_json::from_str(&buffer)?
                };
            },
            _ => {},
        }

        Ok(())
    }
}

fn block_index(body: &Value) -> Result<usize, Error> {
    body["index"]
        .as_u64()
        .map(|i| i as usize)
        .ok_or(Error::LLMResponseError("can't extract content block index from LLM API response."))
}
