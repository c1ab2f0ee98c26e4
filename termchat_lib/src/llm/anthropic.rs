use crate::llm::LLMChat;
use crate::config::Config;
use crate::error::Error;
use crate::tools::ToolGroup;
use serde_json::{json, Value};
use tracing::{debug, warn};
use crate::request::Client;
use super::caching::inject_prompt_caching;
use super::messages::Text;
use super::stream::{MessageAccumulator, StreamedMessage};
use super::{Delta, Message, Role, ToolCall, ToolResult};
use super::util::{self, llm_to_role};

/// Minimum extended thinking budget accepted by the API.
const MIN_THINKING_BUDGET: i64 = 1024;

pub struct AnthropicChat {
    system_prompt: String,
    history: Vec<Value>,
    config: Config,
    client: Box<dyn Client>,
    tools: Option<ToolGroup>,
}

impl AnthropicChat {
    pub(super) fn new(mut config: Config, client: Box<dyn Client>, tools: Option<ToolGroup>) -> Result<Self, Error> {
        if config.max_tokens <= 0 {
            return Err(Error::MissingArgError("max-tokens must be greater than zero."))
        }
        if let Some(budget) = config.thinking_budget {
            if budget < MIN_THINKING_BUDGET || budget >= config.max_tokens {
                return Err(Error::Error(format!(
                    "thinking budget must be at least {MIN_THINKING_BUDGET} and less than max-tokens ({}).", config.max_tokens
                )));
            }
            if config.temperature.is_some() {
                return Err(Error::Error("temperature can't be set when extended thinking is enabled.".to_owned()));
            }
        }

        if let Some(flag) = tools.as_ref().and_then(|group| group.beta_flag.as_ref()) {
            if !config.betas.contains(flag) {
                config.betas.push(flag.clone());
            }
        }

        Ok(AnthropicChat {
            system_prompt: String::new(),
            history: vec![],
            config,
            client,
            tools,
        })
    }

    fn prep_payload(&mut self, messages: &[Message]) -> Value {

        let mut turns: Vec<(Role, Vec<Value>)> = vec![];
        for message in messages {
            let role = message.role();
            match turns.last_mut() {
                Some((r, content)) if *r == role => content.push(content_block(message)),
                _ => turns.push((role, vec![content_block(message)])),
            }
        }
        for (role, content) in turns {
            self.history.push(json!({"role": role.to_string(), "content": content}));
        }

        if self.config.prompt_caching {
            inject_prompt_caching(&mut self.history);
        }

        let mut payload = json!({
            "model": self.config.name,
            "max_tokens": self.config.max_tokens,
            "stream": true,
        });

        if !self.system_prompt.is_empty() {
            let mut system = json!({"type": "text", "text": self.system_prompt});
            if self.config.prompt_caching {
                system["cache_control"] = json!({"type": "ephemeral"});
            }
            payload["system"] = Value::Array(vec![system]);
        }

        payload["messages"] = Value::Array(self.history.clone());

        util::set_f64_param(&mut payload, "temperature", &self.config.temperature);

        if let Some(budget) = self.config.thinking_budget {
            payload["thinking"] = json!({"type": "enabled", "budget_tokens": budget});
        }

        if let Some(group) = &self.tools {
            payload["tools"] = group.to_params();
        }

        payload
    }

    fn infer(&mut self, messages: &[Message], on_delta: &mut dyn FnMut(Delta)) -> Result<Vec<Message>, Error> {

        let payload = self.prep_payload(messages);

        let beta = self.config.beta_header();
        let mut headers = vec![
            ("x-api-key", self.config.api_key.as_str()),
            ("anthropic-version", self.config.api_version.as_str()),
        ];
        if let Some(beta) = beta.as_deref() {
            headers.push(("anthropic-beta", beta));
        }

        debug!(model = %self.config.name, turns = self.history.len(), "requesting inference");

        let mut acc = MessageAccumulator::new();
        self.client.stream_json_request(&self.config.api_url, payload, &headers, &mut |event| acc.apply(&event, &mut *on_delta))?;

        self.process_response(acc.finish()?)
    }

    fn process_response(&mut self, response: StreamedMessage) -> Result<Vec<Message>, Error> {

        let role = llm_to_role(&response.role)?;
        debug!(stop_reason = ?response.stop_reason, blocks = response.content.len(), "inference finished");

        let mut result = Vec::new();

        for block in response.content.iter() {
            match block["type"].as_str() {
                Some("text") => {
                    let text = block["text"].as_str().unwrap_or_default().to_owned();
                    result.push(Message::Text(Text{role, message: text}));
                },
                Some("tool_use") => {
                    let call_id = block["id"].as_str()
                        .ok_or(Error::LLMResponseError("can't extract tool call id from LLM API response."))?
                        .to_owned();
                    let name = block["name"].as_str()
                        .ok_or(Error::LLMResponseError("can't extract tool name from LLM API response."))?
                        .to_owned();
                    result.push(Message::ToolCall(ToolCall{call_id, name, input: block["input"].clone()}));
                },
                Some("thinking") | Some("redacted_thinking") => {},
                other => warn!(?other, "skipping unsupported content block"),
            }
        }

        // Empty assistant turns are rejected on the next request.
        if !response.content.is_empty() {
            self.history.push(json!({
                "role": response.role,
                "content": response.content,
            }));
        }

        Ok(result)
    }
}

fn content_block(message: &Message) -> Value {
    match message {
        Message::Text(text) => json!({"type": "text", "text": text.message}),
        Message::ToolCall(call) => json!({
            "type": "tool_use",
            "id": call.call_id,
            "name": call.name,
            "input": call.input,
        }),
        Message::ToolResult(result) => tool_result_block(result),
    }
}

fn tool_result_block(result: &ToolResult) -> Value {
    let content = if let Some(error) = &result.error {
        Value::String(error.clone())
    } else {
        let mut content = vec![];
        if let Some(output) = &result.output {
            content.push(json!({"type": "text", "text": output}));
        }
        if let Some(image) = &result.base64_image {
            content.push(json!({
                "type": "image",
                "source": {
                    "type": "base64",
                    "media_type": "image/png",
                    "data": image,
                },
            }));
        }
        Value::Array(content)
    };

    json!({
        "type": "tool_result",
        "tool_use_id": result.call_id,
        "content": content,
        "is_error": result.is_error(),
    })
}

impl LLMChat for AnthropicChat {

    fn get_inference(&mut self, messages: &[Message], on_delta: &mut dyn FnMut(Delta)) -> Result<Vec<Message>, Error> {
        let checkpoint = self.history.len();

        let result = self.infer(messages, on_delta);

        if result.is_err() {
            self.history.truncate(checkpoint);
        }

        result
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }

    fn set_system_prompt(&mut self, prompt: String) {
        self.system_prompt = prompt;
    }

    fn history(&self) -> &[Value] {
        &self.history
    }

    fn replace_history(&mut self, history: Vec<Value>) {
        self.history = history;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PROMPT_CACHING_BETA_FLAG;
    use crate::request::stub::{events, StubCall, StubClient};
    use crate::tools::{Display, ToolVersion};

    fn config() -> Config {
        let mut config = Config::new("<model-name>".to_owned(), "<api-key>".to_owned());
        config.api_url = "<api-uri>".to_owned();
        config.api_version = "<api-ver>".to_owned();
        config.max_tokens = 4096;
        config
    }

    fn text_reply(text: &str) -> Vec<Value> {
        vec![
            json!({"type": "message_start", "message": {"id": "msg_1", "role": "assistant", "content": []}}),
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "text", "text": ""}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "text_delta", "text": text}}),
            json!({"type": "content_block_stop", "index": 0}),
            json!({"type": "message_delta", "delta": {"stop_reason": "end_turn"}}),
            json!({"type": "message_stop"}),
        ]
    }

    fn tool_reply(call_id: &str) -> Vec<Value> {
        vec![
            json!({"type": "message_start", "message": {"id": "msg_2", "role": "assistant", "content": []}}),
            json!({"type": "content_block_start", "index": 0, "content_block": {"type": "tool_use", "id": call_id, "name": "bash", "input": {}}}),
            json!({"type": "content_block_delta", "index": 0, "delta": {"type": "input_json_delta", "partial_json": "{\"command\": \"ls\"}"}}),
            json!({"type": "content_block_stop", "index": 0}),
            json!({"type": "message_delta", "delta": {"stop_reason": "tool_use"}}),
            json!({"type": "message_stop"}),
        ]
    }

    #[test]
    fn test_request_response_ok() {
        let config = config();
        let sys_msg = "test sys message";
        let user_msg = "test user message";
        let model_msg = "test resp message";

        let expected_headers = vec![
            ("x-api-key".to_owned(), config.api_key.clone()),
            ("anthropic-version".to_owned(), config.api_version.clone()),
        ];
        let expected_payload = json!({
            "model": config.name,
            "max_tokens": config.max_tokens,
            "stream": true,
            "system": [{"type": "text", "text": sys_msg}],
            "messages": [
                {"role": "user", "content": [{"type": "text", "text": user_msg}]}
            ],
        });

        let client = Box::new(StubClient::new(expected_headers, vec![
            StubCall { expected_payload: Some(expected_payload), response: Ok(events(text_reply(model_msg))) },
        ]));

        let mut chat = AnthropicChat::new(config, client, None).expect("AnthropicChat initialization");
        chat.set_system_prompt(sys_msg.to_owned());

        let mut streamed = String::new();
        let response = chat.get_inference(&[Message::text(Role::User, user_msg.to_owned())], &mut |delta| {
            if let Delta::Text(text) = delta {
                streamed.push_str(text);
            }
        }).expect("receive response");

        assert_eq!(response, vec![Message::text(Role::Model, model_msg.to_owned())]);
        assert_eq!(streamed, model_msg);
        assert_eq!(chat.history().len(), 2);
        assert_eq!(chat.history()[1], json!({"role": "assistant", "content": [{"type": "text", "text": model_msg}]}));
    }

    #[test]
    fn test_tools_caching_and_tool_results() {
        let mut config = config();
        config.prompt_caching = true;
        config.thinking_budget = Some(2048);
        let tools = ToolGroup::new(ToolVersion::ComputerUse20250124, Display::default());

        let expected_headers = vec![
            ("x-api-key".to_owned(), config.api_key.clone()),
            ("anthropic-version".to_owned(), config.api_version.clone()),
            ("anthropic-beta".to_owned(), format!("computer-use-2025-01-24,{PROMPT_CACHING_BETA_FLAG}")),
        ];
        let first_payload = json!({
            "model": config.name,
            "max_tokens": 4096,
            "stream": true,
            "system": [{"type": "text", "text": "sys", "cache_control": {"type": "ephemeral"}}],
            "messages": [
                {"role": "user", "content": [{"type": "text", "text": "list files", "cache_control": {"type": "ephemeral"}}]}
            ],
            "thinking": {"type": "enabled", "budget_tokens": 2048},
            "tools": tools.to_params(),
        });
        let second_payload = json!({
            "model": config.name,
            "max_tokens": 4096,
            "stream": true,
            "system": [{"type": "text", "text": "sys", "cache_control": {"type": "ephemeral"}}],
            "messages": [
                {"role": "user", "content": [{"type": "text", "text": "list files", "cache_control": {"type": "ephemeral"}}]},
                {"role": "assistant", "content": [{"type": "tool_use", "id": "toolu_1", "name": "bash", "input": {"command": "ls"}}]},
                {"role": "user", "content": [
                    {"type": "tool_result", "tool_use_id": "toolu_1", "content": [
                        {"type": "text", "text": "a.txt"},
                        {"type": "image", "source": {"type": "base64", "media_type": "image/png", "data": "iVBOR"}}
                    ], "is_error": false},
                    {"type": "tool_result", "tool_use_id": "toolu_0", "content": "boom", "is_error": true, "cache_control": {"type": "ephemeral"}}
                ]}
            ],
            "thinking": {"type": "enabled", "budget_tokens": 2048},
            "tools": tools.to_params(),
        });

        let client = Box::new(StubClient::new(expected_headers, vec![
            StubCall { expected_payload: Some(first_payload), response: Ok(events(tool_reply("toolu_1"))) },
            StubCall { expected_payload: Some(second_payload), response: Ok(events(text_reply("done"))) },
        ]));

        let mut chat = AnthropicChat::new(config, client, Some(tools)).expect("AnthropicChat initialization");
        chat.set_system_prompt("sys".to_owned());

        let response = chat.get_inference(&[Message::text(Role::User, "list files".to_owned())], &mut |_| {})
            .expect("receive response");
        assert_eq!(response, vec![Message::ToolCall(ToolCall {
            call_id: "toolu_1".to_owned(),
            name: "bash".to_owned(),
            input: json!({"command": "ls"}),
        })]);

        let results = [
            Message::ToolResult(ToolResult {
                call_id: "toolu_1".to_owned(),
                name: "bash".to_owned(),
                output: Some("a.txt".to_owned()),
                base64_image: Some("iVBOR".to_owned()),
                ..Default::default()
            }),
            Message::ToolResult(ToolResult {
                call_id: "toolu_0".to_owned(),
                name: "computer".to_owned(),
                error: Some("boom".to_owned()),
                ..Default::default()
            }),
        ];
        let response = chat.get_inference(&results, &mut |_| {}).expect("receive response");
        assert_eq!(response, vec![Message::text(Role::Model, "done".to_owned())]);
        assert_eq!(chat.history().len(), 4);
    }

    #[test]
    fn test_request_response_err() {
        let client = Box::new(StubClient::new(vec![
            ("x-api-key".to_owned(), "<api-key>".to_owned()),
            ("anthropic-version".to_owned(), "<api-ver>".to_owned()),
        ], vec![
            StubCall { expected_payload: None, response: Ok(events(text_reply("first"))) },
            StubCall { expected_payload: None, response: Err("test resp message".to_owned()) },
        ]));

        let mut chat = AnthropicChat::new(config(), client, None).expect("AnthropicChat initialization");

        chat.get_inference(&[Message::text(Role::User, "one".to_owned())], &mut |_| {}).expect("first response");
        assert_eq!(chat.history().len(), 2);

        let response = chat.get_inference(&[Message::text(Role::User, "two".to_owned())], &mut |_| {});

        if let Err(Error::LLMErrorMessage(msg)) = response {
            assert_eq!(msg, "test resp message");
        } else {
            panic!("type mismatch");
        }
        assert_eq!(chat.history().len(), 2, "failed turn is rolled back");
    }

    #[test]
    fn test_history_replace_and_clear() {
        let client = Box::new(StubClient::new(vec![], vec![]));
        let mut chat = AnthropicChat::new(config(), client, None).expect("AnthropicChat initialization");

        chat.replace_history(vec![json!({"role": "user", "content": "hi"})]);
        assert_eq!(chat.history().len(), 1);

        chat.clear_history();
        assert!(chat.history().is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let mut cfg = config();
        cfg.max_tokens = 0;
        assert!(AnthropicChat::new(cfg, Box::new(StubClient::new(vec![], vec![])), None).is_err());

        let mut cfg = config();
        cfg.thinking_budget = Some(8192);
        assert!(AnthropicChat::new(cfg, Box::new(StubClient::new(vec![], vec![])), None).is_err());

        let mut cfg = config();
        cfg.thinking_budget = Some(100);
        assert!(AnthropicChat::new(cfg, Box::new(StubClient::new(vec![], vec![])), None).is_err());
    }

    #[test]
    fn test_temperature_with_thinking() {
        let mut cfg = config();
        cfg.thinking_budget = Some(2048);
        cfg.temperature = Some(0.7);
        let res = AnthropicChat::new(cfg, Box::new(StubClient::new(vec![], vec![])), None);
        assert!(matches!(res, Err(Error::Error(msg)) if msg.contains("temperature")));

        let mut cfg = config();
        cfg.temperature = Some(0.7);
        assert!(AnthropicChat::new(cfg, Box::new(StubClient::new(vec![], vec![])), None).is_ok());
    }
}
