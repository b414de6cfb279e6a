//! Protocol header names in the form `http` expects.

use http::HeaderName;

/// `HMAC-Authentication`.
pub const AUTH_HEADER: HeaderName = HeaderName::from_static("hmac-authentication");

/// `HMAC-Authentication-Session`.
pub const SESSION_HEADER: HeaderName = HeaderName::from_static("hmac-authentication-session");
