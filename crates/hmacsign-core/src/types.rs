//! Wire constants and value types of the `HMAC-Authentication` protocol.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// Header carrying the authentication tuple on requests and responses.
pub const HEADER_NAME: &str = "HMAC-Authentication";

/// Header marking a request as a session-start handshake.
pub const SESSION_HEADER_NAME: &str = "HMAC-Authentication-Session";

/// Value of [`SESSION_HEADER_NAME`] on a handshake request.
pub const SESSION_START_VALUE: &str = "Start";

/// Query parameter carrying the authentication tuple in URI-signing mode.
pub const URI_PARAM_NAME: &str = "hmacauthentication";

/// The protocol version spoken by this implementation.
pub const PROTOCOL_VERSION: ProtocolVersion = ProtocolVersion(1);

/// Wire format version. Requests and responses must match exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ProtocolVersion(u32);

impl ProtocolVersion {
    /// Create a protocol version.
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// The numeric version.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether a raw header field names this version.
    ///
    /// A field that is not a plain decimal integer never matches.
    #[must_use]
    pub fn matches(self, field: &str) -> bool {
        field.parse::<u32>().is_ok_and(|v| v == self.0)
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of the shared secret used to sign a message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct KeyId(String);

impl KeyId {
    /// Create a key identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the key identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-use value binding a signature to one exchange.
///
/// Used both for the client nonce and for the server-issued session nonce.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Nonce(String);

impl Nonce {
    /// Create a nonce.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the nonce as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where the authentication tuple of a non-session request is carried.
///
/// Session-capable engines ignore this setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SigningMode {
    /// `HMAC-Authentication` request header.
    #[default]
    Header,
    /// `hmacauthentication` query parameter.
    Uri,
}

impl SigningMode {
    /// Parse a mode name, case-insensitively.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidSigningMode`] for anything other than
    /// `header` or `uri`.
    pub fn parse(name: &str) -> CoreResult<Self> {
        if name.eq_ignore_ascii_case("header") {
            Ok(Self::Header)
        } else if name.eq_ignore_ascii_case("uri") {
            Ok(Self::Uri)
        } else {
            Err(CoreError::InvalidSigningMode(name.to_owned()))
        }
    }
}

impl FromStr for SigningMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SigningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Uri => f.write_str("uri"),
        }
    }
}

/// What a digest is computed for. Engines mix this into the keyed hash so a
/// signature produced for one purpose never validates for another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Purpose {
    /// A standalone signed request, or the handshake request.
    Request,
    /// The server's signature over the session nonce during the handshake.
    SessionResponse,
    /// A per-message request or response body inside an established exchange.
    Message,
}

impl Purpose {
    /// Short label used as the first component of the signed data.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::SessionResponse => "session",
            Self::Message => "message",
        }
    }
}
