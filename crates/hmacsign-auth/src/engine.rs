//! The crypto/session engine seam.
//!
//! The orchestrator never hashes anything itself. It asks a [`CryptoEngine`]
//! for digests, key identity and nonces, and tells it when a session starts
//! and when a message has been exchanged. Whether the client runs the session
//! handshake is decided solely by [`CryptoEngine::capability`].

use hmacsign_core::{KeyId, Nonce, Purpose};

use crate::error::AuthError;

/// Whether an engine can establish and drive an authenticated session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCapability {
    /// One signed message per client, carrying key id and nonce.
    SingleShot,
    /// Handshake once, then sign any number of messages with rotating state.
    Session,
}

/// Computes and validates digests, and owns nonce and counter state.
///
/// An engine is single-owner: one client drives it, sequentially.
pub trait CryptoEngine: Send {
    /// Which protocol flavour this engine supports.
    fn capability(&self) -> EngineCapability;

    /// Identifier of the shared secret.
    fn key_id(&self) -> &KeyId;

    /// The client nonce bound into request digests.
    fn current_nonce(&self) -> &Nonce;

    /// Compute the hex digest of `data` for `purpose`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the engine's state does not permit a
    /// digest for `purpose`, e.g. a message digest before the session started.
    fn compute_digest(&self, data: &[u8], purpose: Purpose) -> Result<String, AuthError>;

    /// Check that `digest` is the digest of `data` for `purpose`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::SignatureDoesNotMatch`] on mismatch.
    fn validate(&self, data: &[u8], digest: &str, purpose: Purpose) -> Result<(), AuthError>;

    /// Remember the server-issued session nonce.
    fn record_session_nonce(&mut self, _session_nonce: &Nonce) {}

    /// Mark the session as established.
    fn mark_session_started(&mut self) {}

    /// Rotate per-message state after a completed exchange.
    fn advance_message(&mut self) {}

    /// Shorthand for `capability() == EngineCapability::Session`.
    fn is_session_capable(&self) -> bool {
        self.capability() == EngineCapability::Session
    }
}
