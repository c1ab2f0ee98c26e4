use serde_json::Value;
use crate::error::Error;
use super::reqwest::ReqwestClient;
use super::SseEvent;

/// Request client.
pub trait Client {
    /// Send a request whose response is a server-sent event stream.
    /// Every event is handed to `on_event` as soon as it is complete.
    fn stream_json_request(&self,
        url: &str,
        payload: Value,
        headers: &[(&str, &str)],
        on_event: &mut dyn FnMut(SseEvent) -> Result<(), Error>) -> Result<(), Error>;
}

/// Create reqwest client.
pub fn get_reqwest_client() -> Result<Box<dyn Client>, Error> {
    Ok(Box::new(ReqwestClient::new()?))
}
