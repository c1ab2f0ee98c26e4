//! API transport.
mod client;
mod reqwest;
mod sse;

#[cfg(test)]
pub mod stub;

pub use client::Client;
pub use client::get_reqwest_client;
pub use sse::SseEvent;
pub use sse::SseReader;
