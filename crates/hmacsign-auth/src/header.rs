//! Codec for the `HMAC-Authentication` header value.
//!
//! The value is a colon-delimited tuple whose arity identifies its role:
//!
//! ```text
//! version:keyId:nonce:digest      standalone request, handshake request, URI parameter
//! version:sessionNonce:digest     server's handshake answer
//! version:digest                  session message, signed response
//! ```
//!
//! Parsers check the field count before the version, and only accept
//! [`PROTOCOL_VERSION`].

use std::fmt;

use hmacsign_core::{KeyId, Nonce, PROTOCOL_VERSION, ProtocolVersion};

use crate::error::AuthError;

/// A parsed or to-be-rendered authentication header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthHeaderValue {
    /// `version:keyId:nonce:digest`.
    Request {
        /// Protocol version.
        version: ProtocolVersion,
        /// Key that produced the digest.
        key_id: KeyId,
        /// Client nonce bound into the digest.
        nonce: Nonce,
        /// Hex digest.
        digest: String,
    },
    /// `version:sessionNonce:digest`.
    SessionStart {
        /// Protocol version.
        version: ProtocolVersion,
        /// Server-issued session nonce.
        session_nonce: Nonce,
        /// Server's digest over the session nonce.
        digest: String,
    },
    /// `version:digest`.
    Message {
        /// Protocol version.
        version: ProtocolVersion,
        /// Hex digest.
        digest: String,
    },
}

impl AuthHeaderValue {
    /// Build a request tuple at the current protocol version.
    #[must_use]
    pub fn request(key_id: KeyId, nonce: Nonce, digest: impl Into<String>) -> Self {
        Self::Request {
            version: PROTOCOL_VERSION,
            key_id,
            nonce,
            digest: digest.into(),
        }
    }

    /// Build a handshake-answer tuple at the current protocol version.
    #[must_use]
    pub fn session_start(session_nonce: Nonce, digest: impl Into<String>) -> Self {
        Self::SessionStart {
            version: PROTOCOL_VERSION,
            session_nonce,
            digest: digest.into(),
        }
    }

    /// Build a message tuple at the current protocol version.
    #[must_use]
    pub fn message(digest: impl Into<String>) -> Self {
        Self::Message {
            version: PROTOCOL_VERSION,
            digest: digest.into(),
        }
    }

    /// The digest carried by any form.
    #[must_use]
    pub fn digest(&self) -> &str {
        match self {
            Self::Request { digest, .. }
            | Self::SessionStart { digest, .. }
            | Self::Message { digest, .. } => digest,
        }
    }

    /// Parse a 4-field request tuple.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedHeader`] for any other field count and
    /// [`AuthError::VersionMismatch`] for a foreign version.
    pub fn parse_request(value: &str) -> Result<Self, AuthError> {
        let [version, key_id, nonce, digest] = split_fields::<4>(value)?;
        Ok(Self::Request {
            version: check_version(version)?,
            key_id: KeyId::new(key_id),
            nonce: Nonce::new(nonce),
            digest: digest.to_owned(),
        })
    }

    /// Parse a 3-field handshake answer.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedHeader`] for any other field count and
    /// [`AuthError::VersionMismatch`] for a foreign version.
    pub fn parse_session_start(value: &str) -> Result<Self, AuthError> {
        let (session_nonce, digest) = Self::session_start_fields(value)?;
        Ok(Self::SessionStart {
            version: PROTOCOL_VERSION,
            session_nonce,
            digest,
        })
    }

    /// Parse a 3-field handshake answer into its session nonce and digest.
    ///
    /// # Errors
    ///
    /// Same as [`AuthHeaderValue::parse_session_start`].
    pub fn session_start_fields(value: &str) -> Result<(Nonce, String), AuthError> {
        let [version, session_nonce, digest] = split_fields::<3>(value)?;
        check_version(version)?;
        Ok((Nonce::new(session_nonce), digest.to_owned()))
    }

    /// Parse a 2-field message tuple.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MalformedHeader`] for any other field count and
    /// [`AuthError::VersionMismatch`] for a foreign version.
    pub fn parse_message(value: &str) -> Result<Self, AuthError> {
        let [version, digest] = split_fields::<2>(value)?;
        Ok(Self::Message {
            version: check_version(version)?,
            digest: digest.to_owned(),
        })
    }
}

impl fmt::Display for AuthHeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request {
                version,
                key_id,
                nonce,
                digest,
            } => write!(f, "{version}:{key_id}:{nonce}:{digest}"),
            Self::SessionStart {
                version,
                session_nonce,
                digest,
            } => write!(f, "{version}:{session_nonce}:{digest}"),
            Self::Message { version, digest } => write!(f, "{version}:{digest}"),
        }
    }
}

/// Split on every `:` and require exactly `N` fields.
fn split_fields<const N: usize>(value: &str) -> Result<[&str; N], AuthError> {
    let fields: Vec<&str> = value.split(':').collect();
    let found = fields.len();
    fields
        .try_into()
        .map_err(|_| AuthError::MalformedHeader { expected: N, found })
}

fn check_version(field: &str) -> Result<ProtocolVersion, AuthError> {
    if PROTOCOL_VERSION.matches(field) {
        Ok(PROTOCOL_VERSION)
    } else {
        Err(AuthError::VersionMismatch(field.to_owned()))
    }
}
