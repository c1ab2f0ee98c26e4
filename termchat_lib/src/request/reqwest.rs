use std::io::BufReader;
use std::thread;
use std::time::Duration;
use reqwest::StatusCode;
use reqwest::blocking::{Client as BlockingClient, Response};
use serde_json::Value;
use tracing::{debug, warn};
use crate::error::Error;
use crate::request::client::Client;
use super::{SseEvent, SseReader};

const MAX_RETRIES: u32 = 4;
const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(8);

pub struct ReqwestClient {
    client: BlockingClient,
    max_retries: u32,
    initial_backoff: Duration,
}

impl ReqwestClient {

    pub fn new() -> Result<Self, Error> {
        // Streams stay open for as long as the model keeps generating.
        let client = BlockingClient::builder()
            .timeout(Option::<Duration>::None)
            .connect_timeout(Duration::from_secs(30))
            .build()?;

        Ok(ReqwestClient {
            client,
            max_retries: MAX_RETRIES,
            initial_backoff: INITIAL_BACKOFF,
        })
    }

    fn send_with_retry(&self, url: &str, payload: &Value, headers: &[(&str, &str)]) -> Result<Response, Error> {
        let mut attempt = 0;

        loop {
            let mut request = self.client
                .post(url)
                .json(payload);

            for (k, v) in headers {
                request = request.header(*k, *v);
            }

            match request.send() {
                Ok(response) if is_retryable(response.status()) && attempt < self.max_retries => {
                    warn!(status = %response.status(), attempt, "retrying LLM request");
                },
                Ok(response) => return Ok(response),
                Err(err) if (err.is_connect() || err.is_timeout()) && attempt < self.max_retries => {
                    warn!(error = %err, attempt, "retrying LLM request");
                },
                Err(err) => return Err(err.into()),
            }

            thread::sleep(backoff(self.initial_backoff, attempt));
            attempt += 1;
        }
    }
}

impl Client for ReqwestClient {

    fn stream_json_request(&self,
        url: &str,
        payload: Value,
        headers: &[(&str, &str)],
        on_event: &mut dyn FnMut(SseEvent) -> Result<(), Error>) -> Result<(), Error>
    {
        let response = self.send_with_retry(url, &payload, headers)?;
        let status = response.status();
        debug!(%status, "LLM response received");

        if !status.is_success() {
            let body = response.text()?;
            return Err(error_from_body(status, &body));
        }

        let mut reader = SseReader::new(BufReader::new(response));
        while let Some(event) = reader.next_event()? {
            on_event(event)?;
        }

        Ok(())
    }
}

fn is_retryable(status: StatusCode) -> bool {
    matches!(status.as_u16(), 408 | 409 | 429) || status.is_server_error()
}

fn backoff(initial: Duration, attempt: u32) -> Duration {
    initial
        .saturating_mul(2u32.saturating_pow(attempt))
        .min(MAX_BACKOFF)
}

fn error_from_body(status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|body| body["error"]["message"].as_str().map(str::to_owned));

    match message {
        Some(message) => Error::LLMErrorMessage(message),
        None => Error::Error(format!("LLM API returned HTTP {status}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use serde_json::json;

    #[test]
    fn test_backoff() {
        assert_eq!(backoff(INITIAL_BACKOFF, 0), Duration::from_millis(500));
        assert_eq!(backoff(INITIAL_BACKOFF, 1), Duration::from_secs(1));
        assert_eq!(backoff(INITIAL_BACKOFF, 3), Duration::from_secs(4));
        assert_eq!(backoff(INITIAL_BACKOFF, 4), MAX_BACKOFF);
        assert_eq!(backoff(INITIAL_BACKOFF, 40), MAX_BACKOFF);
    }

    #[test]
    fn test_is_retryable() {
        for code in [408, 409, 429, 500, 502, 529] {
            assert!(is_retryable(StatusCode::from_u16(code).unwrap()), "{code}");
        }
        for code in [200, 400, 401, 403, 404, 413] {
            assert!(!is_retryable(StatusCode::from_u16(code).unwrap()), "{code}");
        }
    }

    #[test]
    fn test_error_from_body() {
        let body = r#"{"type": "error", "error": {"type": "authentication_error", "message": "invalid x-api-key"}}"#;
        assert!(matches!(error_from_body(StatusCode::UNAUTHORIZED, body), Error::LLMErrorMessage(m) if m == "invalid x-api-key"));

        let err = error_from_body(StatusCode::BAD_GATEWAY, "{}");
        assert!(matches!(err, Error::Error(m) if m.contains("502")));

        let err = error_from_body(StatusCode::BAD_GATEWAY, "<html><body>Bad Gateway</body></html>");
        assert!(matches!(err, Error::Error(m) if m.contains("502")));
    }

    // Serves `responses` in order, one per connection, counting requests.
    fn serve(responses: Vec<(u16, &'static str, String)>) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let url = format!("http://{}/v1/messages", listener.local_addr().expect("address"));
        let served = Arc::new(AtomicUsize::new(0));
        let counter = served.clone();

        thread::spawn(move || {
            for (status, content_type, body) in responses {
                let (stream, _) = listener.accept().expect("accept");
                let mut reader = BufReader::new(stream);

                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).expect("request line");
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().expect("content length");
                        }
                    }
                }
                let mut request_body = vec![0; content_length];
                reader.read_exact(&mut request_body).expect("request body");
                counter.fetch_add(1, Ordering::SeqCst);

                let mut stream = reader.into_inner();
                write!(stream,
                    "HTTP/1.1 {status} Status\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                ).expect("response");
            }
        });

        (url, served)
    }

    fn fast_client(max_retries: u32) -> ReqwestClient {
        ReqwestClient {
            client: BlockingClient::builder().no_proxy().build().expect("client"),
            max_retries,
            initial_backoff: Duration::from_millis(1),
        }
    }

    fn overloaded() -> (u16, &'static str, String) {
        (529, "application/json", json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}).to_string())
    }

    #[test]
    fn test_retries_until_success() {
        let (url, served) = serve(vec![
            overloaded(),
            overloaded(),
            overloaded(),
            (200, "text/event-stream", "event: ping\ndata: {\"type\": \"ping\"}\n\n".to_owned()),
        ]);

        let mut seen = vec![];
        fast_client(MAX_RETRIES)
            .stream_json_request(&url, json!({"model": "m"}), &[("x-api-key", "k")], &mut |event| {
                seen.push(event);
                Ok(())
            })
            .expect("stream after retries");

        assert_eq!(served.load(Ordering::SeqCst), 4);
        assert_eq!(seen, vec![SseEvent { event: Some("ping".into()), data: "{\"type\": \"ping\"}".into() }]);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let (url, served) = serve(vec![
            (503, "text/html", "<html>down</html>".to_owned()),
            (503, "text/html", "<html>down</html>".to_owned()),
            (503, "text/html", "<html>down</html>".to_owned()),
        ]);

        let res = fast_client(2).stream_json_request(&url, json!({}), &[], &mut |_| Ok(()));

        assert!(matches!(res, Err(Error::Error(m)) if m.contains("503")));
        assert_eq!(served.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_client_error_not_retried() {
        let (url, served) = serve(vec![
            (400, "application/json", json!({"type": "error", "error": {"type": "invalid_request_error", "message": "bad request"}}).to_string()),
            (200, "text/event-stream", String::new()),
        ]);

        let res = fast_client(MAX_RETRIES).stream_json_request(&url, json!({}), &[], &mut |_| Ok(()));

        assert!(matches!(res, Err(Error::LLMErrorMessage(m)) if m == "bad request"));
        assert_eq!(served.load(Ordering::SeqCst), 1);
    }
}
