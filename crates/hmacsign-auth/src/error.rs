//! Error types for HMAC authentication.
//!
//! All signing and verification failures below the orchestrator are
//! represented by [`AuthError`].

/// Errors that can occur while building or checking HMAC authentication data.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The authentication header is absent.
    #[error("authentication missing from {0}")]
    MissingHeader(&'static str),

    /// The authentication header does not have the expected number of fields.
    #[error("malformed HMAC-Authentication header: expected {expected} fields, found {found}")]
    MalformedHeader {
        /// Field count required by the header form being parsed.
        expected: usize,
        /// Field count actually present.
        found: usize,
    },

    /// The header names a protocol version other than ours.
    #[error("HMAC-Authentication version mismatch: {0}")]
    VersionMismatch(String),

    /// The computed digest does not match the provided one.
    #[error("HMAC signature does not match")]
    SignatureDoesNotMatch,

    /// A per-message digest was requested before the session was started.
    #[error("HMAC session has not been started")]
    SessionNotStarted,

    /// The key identifier is not known to the key provider.
    #[error("HMAC key not found: {0}")]
    UnknownKey(String),
}
