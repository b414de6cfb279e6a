//! The transport seam and the request/response types that cross it.
//!
//! A [`Transport`] sends one [`ClientRequest`] and returns one
//! [`ClientResponse`]. Connection handling, TLS and redirects all live behind
//! it. The client composes a transport rather than extending one.

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::TryStreamExt;
use futures::stream::BoxStream;
use hmacsign_auth::canonical::{encode_query, uri_signing_input};
use http::header::AsHeaderName;
use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};

use crate::headers::SESSION_HEADER;

/// Opaque transport failure.
///
/// The client never inspects or wraps these beyond carrying them out of
/// [`HmacHttpClient::send`](crate::HmacHttpClient::send).
pub struct TransportError {
    inner: Box<dyn StdError + Send + Sync>,
}

impl TransportError {
    /// Wrap any error as a transport failure.
    pub fn new(err: impl Into<Box<dyn StdError + Send + Sync>>) -> Self {
        Self { inner: err.into() }
    }

    /// Recover the underlying error.
    #[must_use]
    pub fn into_inner(self) -> Box<dyn StdError + Send + Sync> {
        self.inner
    }
}

impl fmt::Debug for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner.source()
    }
}

/// Sends a request and returns the response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request` and return the server's response.
    async fn send(&self, request: ClientRequest) -> Result<ClientResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ClientRequest) -> Result<ClientResponse, TransportError> {
        (**self).send(request).await
    }
}

/// An outgoing request.
///
/// Query parameters are held apart from the URI and merged into it only when
/// the transport builds the wire request ([`ClientRequest::full_uri`]). The
/// URI string used for header signing therefore does not include them.
#[derive(Debug, Clone)]
pub struct ClientRequest {
    method: Method,
    uri: Uri,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
}

impl ClientRequest {
    /// Create a request with no query parameters, headers or body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create a request from a URI string.
    ///
    /// # Errors
    ///
    /// Returns the parse error if `uri` is not a valid URI.
    pub fn parse(method: Method, uri: &str) -> Result<Self, http::uri::InvalidUri> {
        Ok(Self::new(method, uri.parse()?))
    }

    /// Set the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Add a header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Add or replace a query parameter.
    ///
    /// Parameters held here are merged into the URI on the wire but are not
    /// part of the header-mode signing input, which covers only
    /// [`ClientRequest::uri_string`]. Put parameters that must be signed in
    /// the URI passed to [`ClientRequest::parse`]. URI-mode signing covers both.
    #[must_use]
    pub fn with_query_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_query_param(name, value);
        self
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Target URI, without the separately held query parameters.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// The URI rendered as a string, as used in signing input.
    #[must_use]
    pub fn uri_string(&self) -> String {
        self.uri.to_string()
    }

    /// Query parameters in insertion order.
    #[must_use]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Set a query parameter, replacing an existing one of the same name in
    /// place or appending it otherwise.
    pub fn set_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.query.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.query.push((name, value)),
        }
    }

    /// The query parameters form-encoded.
    #[must_use]
    pub fn query_string(&self) -> String {
        encode_query(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// The URI with query parameters merged in, as sent on the wire.
    #[must_use]
    pub fn full_uri(&self) -> String {
        uri_signing_input(&self.uri_string(), &self.query_string())
    }

    /// Request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Derive the bodiless session-start request from this one.
    ///
    /// The copy owns its own header map, so signing it leaves `self` untouched.
    #[must_use]
    pub fn clone_for_session_start(&self) -> Self {
        let mut request = self.clone();
        request.headers.insert(
            SESSION_HEADER,
            HeaderValue::from_static(hmacsign_core::SESSION_START_VALUE),
        );
        request.body = Bytes::new();
        request
    }

    /// Split into method, full URI, headers and body.
    #[must_use]
    pub fn into_parts(self) -> (Method, String, HeaderMap, Bytes) {
        let uri = self.full_uri();
        (self.method, uri, self.headers, self.body)
    }
}

/// Response body as delivered by the transport.
pub enum ResponseBody {
    /// Fully read into memory.
    Buffered(Bytes),
    /// Delivered incrementally. Such bodies are not verified.
    Streamed(BoxStream<'static, Result<Bytes, TransportError>>),
}

impl fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buffered(bytes) => f.debug_tuple("Buffered").field(&bytes.len()).finish(),
            Self::Streamed(_) => f.write_str("Streamed"),
        }
    }
}

impl From<Bytes> for ResponseBody {
    fn from(bytes: Bytes) -> Self {
        Self::Buffered(bytes)
    }
}

/// A response as delivered by the transport.
#[derive(Debug)]
pub struct ClientResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

impl ClientResponse {
    /// Assemble a response.
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Assemble a response with a buffered body.
    #[must_use]
    pub fn buffered(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self::new(status, headers, ResponseBody::Buffered(body.into()))
    }

    /// HTTP status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A header value as a string, if present and visible ASCII.
    #[must_use]
    pub fn header_str(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// The body.
    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// The buffered body, or `None` for a streamed one.
    #[must_use]
    pub fn bytes(&self) -> Option<&Bytes> {
        match &self.body {
            ResponseBody::Buffered(bytes) => Some(bytes),
            ResponseBody::Streamed(_) => None,
        }
    }

    /// Whether the body is delivered incrementally.
    #[must_use]
    pub fn is_streamed(&self) -> bool {
        matches!(self.body, ResponseBody::Streamed(_))
    }

    /// Take the body out of the response.
    #[must_use]
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Read the whole body, draining a stream if necessary.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by a streamed body.
    pub async fn into_bytes(self) -> Result<Bytes, TransportError> {
        match self.body {
            ResponseBody::Buffered(bytes) => Ok(bytes),
            ResponseBody::Streamed(stream) => {
                let buf = stream
                    .try_fold(BytesMut::new(), |mut buf, chunk| async move {
                        buf.extend_from_slice(&chunk);
                        Ok(buf)
                    })
                    .await?;
                Ok(buf.freeze())
            }
        }
    }
}
