//! Error types for photoblog operations.
//!
//! Transport and API failures are recoverable: the cache leaves its state
//! untouched and the caller may simply retry. A post that does not exist is
//! not an error at all and surfaces as `Ok(None)`.

use std::fmt;
use thiserror::Error;

/// The unified error type for photoblog operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, decoding).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Non-success responses from the blog API.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors (URLs, configuration values, ids).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Programmer errors, such as extending a partition that was never
    /// initialized.
    #[error("invariant violated: {0}")]
    Invariant(#[from] InvariantError),
}

impl Error {
    /// Returns true if repeating the same operation may succeed.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Api(_))
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// The response body could not be decoded.
    #[error("malformed response: {message}")]
    Decode { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-success response from the blog API.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Message from the response envelope, if one could be parsed.
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if the server reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid post id.
    #[error("invalid post id '{value}': {reason}")]
    PostId { value: String, reason: String },

    /// Invalid configuration value.
    #[error("invalid config field '{field}': {reason}")]
    Config { field: &'static str, reason: String },
}

/// Violations of cache invariants.
#[derive(Debug, Error)]
pub enum InvariantError {
    /// A partition operation required an initialized partition.
    #[error("partition '{key}' has not been initialized")]
    PartitionMissing { key: String },

    /// More posts were requested before any feed was shown.
    #[error("no feed is active")]
    NoActiveFeed,
}
