//! photoblog-http - HTTP-backed content gateway.

mod client;
mod endpoints;
mod gateway;

pub use client::ApiClient;
pub use gateway::HttpGateway;
