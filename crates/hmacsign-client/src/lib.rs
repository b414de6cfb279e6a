//! HTTP client layer for the `HMAC-Authentication` protocol.
//!
//! [`HmacHttpClient`] wraps any [`Transport`] and exposes the same `send`
//! contract. Before a request leaves, it is signed according to the bound
//! [`CryptoEngine`](hmacsign_auth::CryptoEngine):
//!
//! - a single-shot engine signs exactly one message per client, either as an
//!   `HMAC-Authentication` header or as a `hmacauthentication` query parameter;
//! - a session-capable engine first runs a handshake, then signs every message
//!   with the short `version:digest` form.
//!
//! Successful (2xx) responses must carry a valid `version:digest` header over
//! the full body or the call fails. A remote 401 is always an error, enriched
//! with whatever diagnostics the server put in its JSON body.
//!
//! # Usage
//!
//! ```rust,ignore
//! use hmacsign_auth::HmacSha256SessionEngine;
//! use hmacsign_client::{ClientRequest, HmacHttpClient, ReqwestTransport};
//! use hmacsign_core::KeyId;
//!
//! let mut client = HmacHttpClient::new(ReqwestTransport::default());
//! client.set_engine(Box::new(HmacSha256SessionEngine::new(KeyId::new("app"), b"secret")));
//!
//! let request = ClientRequest::parse(http::Method::GET, "https://api.example.com/items")?;
//! let response = client.send(request).await?;
//! ```
//!
//! # Modules
//!
//! - [`client`] - The request orchestrator
//! - [`error`] - Client error taxonomy
//! - [`handshake`] - Session-start exchange
//! - [`headers`] - Protocol header names as [`http::HeaderName`]s
//! - [`remote_error`] - Interpretation of remote 401 bodies
//! - [`signer`] - Header, URI and session-message signing
//! - [`transport`] - The transport seam and its request/response types
//! - [`verifier`] - Signed-response verification

pub mod client;
pub mod error;
pub mod handshake;
pub mod headers;
pub mod remote_error;
#[cfg(feature = "reqwest")]
pub mod reqwest_transport;
pub mod signer;
pub mod transport;
pub mod verifier;


pub use client::{HmacHttpClient, SessionState};
pub use error::HmacError;
#[cfg(feature = "reqwest")]
pub use reqwest_transport::ReqwestTransport;
pub use transport::{ClientRequest, ClientResponse, ResponseBody, Transport, TransportError};
