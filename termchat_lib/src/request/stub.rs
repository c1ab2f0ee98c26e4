//! Only for tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use serde_json::Value;
use crate::error::Error;
use crate::request::client::Client;
use super::SseEvent;

/// One expected request and the canned reply.
pub struct StubCall {
    /// Payload the request must carry, not checked when `None`.
    pub expected_payload: Option<Value>,
    /// Events to replay, or an error message.
    pub response: Result<Vec<SseEvent>, String>,
}

/// Client for tests.
pub struct StubClient {
    expected_headers: Vec<(String, String)>,
    calls: RefCell<VecDeque<StubCall>>,
}

impl StubClient {

    /// Create client.
    pub fn new(expected_headers: Vec<(String, String)>, calls: Vec<StubCall>) -> Self {
        StubClient {
            expected_headers,
            calls: RefCell::new(calls.into()),
        }
    }
}

/// Build stream events from JSON bodies, naming each after its `type`.
pub fn events(bodies: Vec<Value>) -> Vec<SseEvent> {
    bodies.into_iter()
        .map(|body| SseEvent {
            event: body["type"].as_str().map(str::to_owned),
            data: body.to_string(),
        })
        .collect()
}

impl Client for StubClient {

    fn stream_json_request(&self,
        _url: &str,
        payload: Value,
        headers: &[(&str, &str)],
        on_event: &mut dyn FnMut(SseEvent) -> Result<(), Error>) -> Result<(), Error>
    {
        assert_eq!(headers.len(), self.expected_headers.len(), "headers count");
        for (expected, actual) in headers.iter().zip(self.expected_headers.iter()) {
            assert_eq!(expected.0, actual.0, "headers keys");
            assert_eq!(expected.1, actual.1, "headers values");
        }

        let call = self.calls.borrow_mut().pop_front().expect("unexpected request");

        if let Some(expected_payload) = call.expected_payload {
            assert_eq!(payload, expected_payload);
        }

        match call.response {
            Ok(events) => {
                for event in events {
                    on_event(event)?;
                }
                Ok(())
            },
            Err(message) => Err(Error::LLMErrorMessage(message)),
        }
    }
}
