//! HTTP transport collaborator
//!
//! The invocation engine speaks to the network through the [`Transport`]
//! trait. The default implementation wraps a shared [`reqwest::Client`];
//! anything else that can turn a [`WireRequest`] into a [`WireResponse`]
//! works, which is also how the unit tests substitute a recording double.

use async_trait::async_trait;
use bytes::Bytes;
use declarest_core::Verb;
use http::{HeaderMap, StatusCode};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Failure at the transport layer: connection, I/O, malformed URL
///
/// Transport errors are propagated to the caller unmodified; they never run
/// through the exception mapping chain.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("invalid request URL '{0}'")]
    InvalidUrl(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// One outgoing request, fully assembled
#[derive(Debug, Clone)]
pub struct WireRequest {
    pub verb: Verb,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

/// One response, with the body fully drained
///
/// Buffering the body here is what makes response release deterministic:
/// nothing borrows the connection after `send` returns, and the buffer drops
/// with the call scope on every exit path.
#[derive(Debug, Clone)]
pub struct WireResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Trait for HTTP transports
///
/// Timeouts, retries and connection pooling are the transport's business;
/// the invocation engine neither retries nor enforces deadlines.
///
/// # Object Safety
///
/// This trait is object-safe and is used as `Arc<dyn Transport>`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and return the drained response
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] for connection or I/O failures.
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

/// Reqwest-backed transport
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a default client and a 600 second timeout
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(600))
                .build()
                .unwrap(),
        }
    }

    /// Create a transport around a caller-configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|_| TransportError::InvalidUrl(request.url.clone()))?;

        let method = match request.verb {
            Verb::Get => reqwest::Method::GET,
            Verb::Put => reqwest::Method::PUT,
            Verb::Post => reqwest::Method::POST,
            Verb::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url).headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(WireResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Verify trait is object-safe
    fn _assert_object_safe(_: &dyn Transport) {}

    #[tokio::test]
    async fn invalid_url_is_rejected_before_sending() {
        let transport = ReqwestTransport::new();
        let request = WireRequest {
            verb: Verb::Get,
            url: "not a url".to_string(),
            headers: HeaderMap::new(),
            body: None,
        };

        let err = transport.send(request).await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl(_)));
    }
}
