//! The request orchestrator.
//!
//! [`HmacHttpClient::send`] runs, in order:
//!
//! 1. require a bound engine;
//! 2. session-capable engine: handshake if no session is active, then sign
//!    with the 2-field message form;
//! 3. single-shot engine: refuse if a message was already sent, then sign
//!    as a header or as a query parameter per [`SigningMode`];
//! 4. send through the transport;
//! 5. turn a 401 into an error, enriched with the server's diagnostics;
//! 6. verify a 2xx response's signature;
//! 7. count the message and let the engine rotate its per-message state.
//!
//! Steps 1–3 fail before any I/O. Nothing is retried. Counters, session state
//! and the signed-URI cache belong to one client instance; `send` takes
//! `&mut self`, so a client is driven by one sender at a time.

use std::fmt;

use hmacsign_auth::CryptoEngine;
use hmacsign_core::{HmacClientConfig, SigningMode};
use http::StatusCode;
use tracing::debug;

use crate::error::HmacError;
use crate::transport::{ClientRequest, ClientResponse, Transport};
use crate::{handshake, remote_error, signer, verifier};

/// Progress of the session handshake for a session-capable engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No session has been established.
    #[default]
    NoSession,
    /// The session-start exchange is in flight.
    Handshaking,
    /// The server confirmed the session.
    Active,
}

/// HTTP client that signs requests and verifies responses.
pub struct HmacHttpClient<T> {
    transport: T,
    config: HmacClientConfig,
    engine: Option<Box<dyn CryptoEngine>>,
    signing_mode: SigningMode,
    message_count: u64,
    session: SessionState,
    signed_uri: Option<String>,
}

impl<T: Transport> HmacHttpClient<T> {
    /// Create a client with default configuration.
    #[must_use]
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, HmacClientConfig::default())
    }

    /// Create a client with the given configuration.
    #[must_use]
    pub fn with_config(transport: T, config: HmacClientConfig) -> Self {
        Self {
            transport,
            signing_mode: config.signing_mode,
            config,
            engine: None,
            message_count: 0,
            session: SessionState::NoSession,
            signed_uri: None,
        }
    }

    /// Bind the engine used for all subsequent sends.
    pub fn set_engine(&mut self, engine: Box<dyn CryptoEngine>) -> &mut Self {
        self.engine = Some(engine);
        self
    }

    /// The bound engine.
    #[must_use]
    pub fn engine(&self) -> Option<&dyn CryptoEngine> {
        self.engine.as_deref()
    }

    /// The bound engine, mutably.
    pub fn engine_mut(&mut self) -> Option<&mut (dyn CryptoEngine + 'static)> {
        self.engine.as_deref_mut()
    }

    /// Unbind and return the engine.
    pub fn take_engine(&mut self) -> Option<Box<dyn CryptoEngine>> {
        self.engine.take()
    }

    /// Choose how single-shot requests carry their authentication.
    pub fn set_signing_mode(&mut self, mode: SigningMode) -> &mut Self {
        self.signing_mode = mode;
        self
    }

    /// Current signing mode.
    #[must_use]
    pub fn signing_mode(&self) -> SigningMode {
        self.signing_mode
    }

    /// Number of completed sends.
    #[must_use]
    pub fn message_count(&self) -> u64 {
        self.message_count
    }

    /// Session handshake progress.
    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.session
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &HmacClientConfig {
        &self.config
    }

    /// The wrapped transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sign `request` into its URI and return the signed URI.
    ///
    /// The first call adds the `hmacauthentication` parameter to `request`.
    /// Every later call returns the same string and leaves its argument alone.
    ///
    /// # Errors
    ///
    /// Returns [`HmacError::Configuration`] if no engine is bound.
    pub fn signed_uri(&mut self, request: &mut ClientRequest) -> Result<String, HmacError> {
        if let Some(uri) = &self.signed_uri {
            return Ok(uri.clone());
        }
        let engine = self.engine.as_deref().ok_or_else(HmacError::missing_engine)?;
        let uri = signer::sign_uri(engine, request)?;
        self.signed_uri = Some(uri.clone());
        Ok(uri)
    }

    /// Sign and send `request`, then verify the response.
    ///
    /// # Errors
    ///
    /// - [`HmacError::Configuration`] if no engine is bound.
    /// - [`HmacError::ProtocolViolation`] if a single-shot client already sent
    ///   its message. Nothing is sent.
    /// - [`HmacError::Protocol`] / [`HmacError::Authentication`] if the
    ///   handshake or response verification fails, or the server answers 401.
    /// - [`HmacError::Transport`] unchanged from the transport.
    pub async fn send(&mut self, mut request: ClientRequest) -> Result<ClientResponse, HmacError> {
        let engine = self
            .engine
            .as_deref_mut()
            .ok_or_else(HmacError::missing_engine)?;
        let session_capable = engine.is_session_capable();

        if session_capable {
            if self.session != SessionState::Active {
                self.session = SessionState::Handshaking;
                let started =
                    handshake::start_session(&self.transport, engine, &request, &self.config).await;
                self.session = if started.is_ok() {
                    SessionState::Active
                } else {
                    SessionState::NoSession
                };
                started?;
            }
            signer::sign_session_message(engine, &mut request)?;
        } else {
            if self.message_count > 0 {
                return Err(HmacError::ProtocolViolation(
                    "a non-session client may sign only one message".to_owned(),
                ));
            }
            match self.signing_mode {
                SigningMode::Header => signer::sign_request(engine, &mut request)?,
                SigningMode::Uri => {
                    if self.signed_uri.is_none() {
                        self.signed_uri = Some(signer::sign_uri(engine, &mut request)?);
                    }
                }
            }
        }

        let response = self.transport.send(request).await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(remote_error::from_unauthorized(response, session_capable, &self.config).await);
        }
        if status.is_success() {
            verifier::verify_response(engine, &response)?;
        }

        self.message_count += 1;
        if session_capable {
            engine.advance_message();
        }
        debug!(%status, message_count = self.message_count, "HMAC exchange completed");

        Ok(response)
    }
}

impl<T: fmt::Debug> fmt::Debug for HmacHttpClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacHttpClient")
            .field("transport", &self.transport)
            .field("engine", &self.engine.as_ref().map(|e| e.capability()))
            .field("signing_mode", &self.signing_mode)
            .field("message_count", &self.message_count)
            .field("session", &self.session)
            .field("signed_uri", &self.signed_uri)
            .finish_non_exhaustive()
    }
}
