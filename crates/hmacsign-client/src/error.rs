//! Client error taxonomy.
//!
//! Every failure of [`HmacHttpClient::send`](crate::HmacHttpClient::send)
//! aborts that call. Nothing is retried at this layer.

use hmacsign_auth::AuthError;
use http::StatusCode;

use crate::transport::TransportError;

/// Errors raised by the HMAC client.
#[derive(Debug, thiserror::Error)]
pub enum HmacError {
    /// The client is not usable as configured, e.g. no engine bound.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Local protocol state forbids the operation, e.g. a second message on a
    /// single-shot client. Raised before anything is sent.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The peer's authentication data is absent or malformed.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A signature failed to validate locally, or the server answered 401.
    #[error("authentication error: {message}")]
    Authentication {
        /// Human-readable description, including remote diagnostics.
        message: String,
        /// HTTP status when the failure came from the server.
        status: Option<StatusCode>,
    },

    /// The transport failed; passed through unchanged.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl HmacError {
    /// The HTTP status attached to a remote authentication failure.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Authentication { status, .. } => *status,
            _ => None,
        }
    }

    pub(crate) fn missing_engine() -> Self {
        Self::Configuration("an HMAC engine is required for the request".to_owned())
    }
}

impl From<AuthError> for HmacError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MalformedHeader { .. } | AuthError::VersionMismatch(_) => {
                Self::Protocol(err.to_string())
            }
            AuthError::MissingHeader(_) | AuthError::SignatureDoesNotMatch => {
                Self::Authentication {
                    message: err.to_string(),
                    status: None,
                }
            }
            AuthError::SessionNotStarted | AuthError::UnknownKey(_) => {
                Self::ProtocolViolation(err.to_string())
            }
        }
    }
}
