//! Blog API HTTP client.

use std::time::Duration;

use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace};

use photoblog_core::error::{ApiError, TransportError};
use photoblog_core::{ApiUrl, Error, Result};

use crate::endpoints::{Envelope, ErrorEnvelope};

/// HTTP client for the blog API.
///
/// Every request carries the API key; responses are unwrapped from the
/// `{ meta, response }` envelope.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base: ApiUrl,
    api_key: String,
}

impl ApiClient {
    /// Create a new client for the given API base.
    pub fn new(base: ApiUrl, api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("photoblog/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            client,
            base,
            api_key: api_key.into(),
        })
    }

    /// Make a GET request against an endpoint and unwrap the envelope.
    #[instrument(skip(self), fields(api = %self.base))]
    pub async fn query<Q, R>(&self, endpoint: &str, params: &Q) -> Result<R>
    where
        Q: Serialize + std::fmt::Debug,
        R: DeserializeOwned,
    {
        let url = self.base.endpoint(endpoint);
        debug!(endpoint, "API query");
        trace!(?params, "query parameters");

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(transport_error)?;

        self.handle_response(response).await
    }

    /// Handle a response, parsing the body or error.
    async fn handle_response<R: DeserializeOwned>(&self, response: reqwest::Response) -> Result<R> {
        let status = response.status();
        trace!(status = %status, "API response");

        if status.is_success() {
            let body = response
                .json::<Envelope<R>>()
                .await
                .map_err(transport_error)?;
            Ok(body.response)
        } else {
            Err(Error::Api(self.parse_error_response(response).await))
        }
    }

    /// Parse an error envelope, tolerating bodies that are not JSON.
    async fn parse_error_response(&self, response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();

        match response.json::<ErrorEnvelope>().await {
            Ok(body) => ApiError::new(status, body.meta.map(|meta| meta.msg)),
            Err(_) => ApiError::new(status, None),
        }
    }
}

/// Classify a reqwest failure.
pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else if err.is_decode() {
        TransportError::Decode {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_creation() {
        let base = ApiUrl::new("https://api.tumblr.com/v2/blog/example.tumblr.com").unwrap();
        let client = ApiClient::new(base.clone(), "key", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base, base);
    }
}
