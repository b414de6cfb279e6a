//! HMAC-SHA256 reference engines.
//!
//! Both engines sign the same framed input:
//!
//! ```text
//! label ":" nonce ":" data                                   single-shot, handshake
//! label ":" nonce ":" sessionNonce ":" counter ":" data      session messages
//! ```
//!
//! where `label` is [`Purpose::label`]. The digest is the lowercase hex
//! HMAC-SHA256 of that input under the shared secret. A server holding the
//! same secret and the nonces exchanged on the wire derives identical digests.

use std::fmt;

use hmac::{Hmac, KeyInit, Mac};
use hmacsign_core::{KeyId, Nonce, Purpose};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::engine::{CryptoEngine, EngineCapability};
use crate::error::AuthError;
use crate::keys::KeyProvider;

type HmacSha256 = Hmac<Sha256>;

/// Single-shot engine: one nonce, one signed message.
pub struct HmacSha256Engine {
    key_id: KeyId,
    secret: Vec<u8>,
    nonce: Nonce,
}

impl HmacSha256Engine {
    /// Create an engine with a freshly generated nonce.
    #[must_use]
    pub fn new(key_id: KeyId, secret: impl AsRef<[u8]>) -> Self {
        Self::with_nonce(key_id, secret, generate_nonce())
    }

    /// Create an engine bound to a known nonce.
    ///
    /// Servers use this to mirror the client's engine from the received header.
    #[must_use]
    pub fn with_nonce(key_id: KeyId, secret: impl AsRef<[u8]>, nonce: Nonce) -> Self {
        Self {
            key_id,
            secret: secret.as_ref().to_vec(),
            nonce,
        }
    }

    /// Create an engine whose secret is resolved through a key provider.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownKey`] if the provider does not know `key_id`.
    pub fn from_provider(provider: &dyn KeyProvider, key_id: KeyId) -> Result<Self, AuthError> {
        let secret = provider.get_secret(&key_id)?;
        Ok(Self::new(key_id, secret))
    }
}

impl fmt::Debug for HmacSha256Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSha256Engine")
            .field("key_id", &self.key_id)
            .field("nonce", &self.nonce)
            .finish_non_exhaustive()
    }
}

impl CryptoEngine for HmacSha256Engine {
    fn capability(&self) -> EngineCapability {
        EngineCapability::SingleShot
    }

    fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    fn current_nonce(&self) -> &Nonce {
        &self.nonce
    }

    fn compute_digest(&self, data: &[u8], purpose: Purpose) -> Result<String, AuthError> {
        Ok(hmac_hex(
            &self.secret,
            &[purpose.label().as_bytes(), self.nonce.as_str().as_bytes()],
            data,
        ))
    }

    fn validate(&self, data: &[u8], digest: &str, purpose: Purpose) -> Result<(), AuthError> {
        let expected = self.compute_digest(data, purpose)?;
        constant_time_check(&expected, digest)
    }
}

/// Session-capable engine.
///
/// Request and handshake digests bind only the client nonce. Once the
/// session has started, message digests additionally bind the server's
/// session nonce and a per-message counter advanced by
/// [`CryptoEngine::advance_message`].
pub struct HmacSha256SessionEngine {
    key_id: KeyId,
    secret: Vec<u8>,
    nonce: Nonce,
    session_nonce: Option<Nonce>,
    started: bool,
    counter: u64,
}

impl HmacSha256SessionEngine {
    /// Create a session engine with a freshly generated nonce.
    #[must_use]
    pub fn new(key_id: KeyId, secret: impl AsRef<[u8]>) -> Self {
        Self::with_nonce(key_id, secret, generate_nonce())
    }

    /// Create a session engine bound to a known nonce.
    #[must_use]
    pub fn with_nonce(key_id: KeyId, secret: impl AsRef<[u8]>, nonce: Nonce) -> Self {
        Self {
            key_id,
            secret: secret.as_ref().to_vec(),
            nonce,
            session_nonce: None,
            started: false,
            counter: 0,
        }
    }

    /// Create a session engine whose secret is resolved through a key provider.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownKey`] if the provider does not know `key_id`.
    pub fn from_provider(provider: &dyn KeyProvider, key_id: KeyId) -> Result<Self, AuthError> {
        let secret = provider.get_secret(&key_id)?;
        Ok(Self::new(key_id, secret))
    }

    /// The server-issued session nonce, once recorded.
    #[must_use]
    pub fn session_nonce(&self) -> Option<&Nonce> {
        self.session_nonce.as_ref()
    }

    /// Whether [`CryptoEngine::mark_session_started`] has been called.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Number of completed message exchanges.
    #[must_use]
    pub fn message_counter(&self) -> u64 {
        self.counter
    }
}

impl fmt::Debug for HmacSha256SessionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSha256SessionEngine")
            .field("key_id", &self.key_id)
            .field("nonce", &self.nonce)
            .field("session_nonce", &self.session_nonce)
            .field("started", &self.started)
            .field("counter", &self.counter)
            .finish_non_exhaustive()
    }
}

impl CryptoEngine for HmacSha256SessionEngine {
    fn capability(&self) -> EngineCapability {
        EngineCapability::Session
    }

    fn key_id(&self) -> &KeyId {
        &self.key_id
    }

    fn current_nonce(&self) -> &Nonce {
        &self.nonce
    }

    fn compute_digest(&self, data: &[u8], purpose: Purpose) -> Result<String, AuthError> {
        let label = purpose.label().as_bytes();
        let nonce = self.nonce.as_str().as_bytes();
        match purpose {
            Purpose::Request | Purpose::SessionResponse => {
                Ok(hmac_hex(&self.secret, &[label, nonce], data))
            }
            Purpose::Message => {
                let session_nonce = match (&self.session_nonce, self.started) {
                    (Some(n), true) => n,
                    _ => return Err(AuthError::SessionNotStarted),
                };
                let counter = self.counter.to_string();
                Ok(hmac_hex(
                    &self.secret,
                    &[
                        label,
                        nonce,
                        session_nonce.as_str().as_bytes(),
                        counter.as_bytes(),
                    ],
                    data,
                ))
            }
        }
    }

    fn validate(&self, data: &[u8], digest: &str, purpose: Purpose) -> Result<(), AuthError> {
        let expected = self.compute_digest(data, purpose)?;
        constant_time_check(&expected, digest)
    }

    fn record_session_nonce(&mut self, session_nonce: &Nonce) {
        self.session_nonce = Some(session_nonce.clone());
    }

    fn mark_session_started(&mut self) {
        debug!(key_id = %self.key_id, "HMAC session engine started");
        self.started = true;
    }

    fn advance_message(&mut self) {
        self.counter += 1;
    }
}

/// Generate a single-use nonce.
fn generate_nonce() -> Nonce {
    Nonce::new(uuid::Uuid::new_v4().simple().to_string())
}

/// HMAC-SHA256 over `prefix[0] ":" prefix[1] ":" ... ":" data`, hex encoded.
fn hmac_hex(secret: &[u8], prefix: &[&[u8]], data: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can accept keys of any length");
    for part in prefix {
        mac.update(part);
        mac.update(b":");
    }
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_check(expected: &str, provided: &str) -> Result<(), AuthError> {
    if expected.as_bytes().ct_eq(provided.as_bytes()).into() {
        Ok(())
    } else {
        debug!(expected, provided, "HMAC digest mismatch");
        Err(AuthError::SignatureDoesNotMatch)
    }
}
