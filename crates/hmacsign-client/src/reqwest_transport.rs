//! [`Transport`] backed by [`reqwest::Client`].

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use tracing::debug;

use crate::transport::{ClientRequest, ClientResponse, ResponseBody, Transport, TransportError};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends requests with `reqwest`.
///
/// Responses are buffered unless the transport was built with
/// [`ReqwestTransport::streaming`], in which case bodies are handed back as a
/// chunk stream and the client skips signature verification for them.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    stream: bool,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("hmacsign/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();
        Self::new(client)
    }
}

impl ReqwestTransport {
    /// Wrap an existing `reqwest` client.
    #[must_use]
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            stream: false,
        }
    }

    /// Return response bodies as streams instead of buffering them.
    #[must_use]
    pub fn streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: ClientRequest) -> Result<ClientResponse, TransportError> {
        let (method, uri, headers, body) = request.into_parts();
        debug!(%method, uri, "sending HTTP request");

        let response = self
            .client
            .request(method, uri)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(TransportError::new)?;

        let status = response.status();
        let headers = response.headers().clone();

        let body = if self.stream {
            ResponseBody::Streamed(Box::pin(
                response.bytes_stream().map_err(TransportError::new),
            ))
        } else {
            ResponseBody::Buffered(response.bytes().await.map_err(TransportError::new)?)
        };

        Ok(ClientResponse::new(status, headers, body))
    }
}
