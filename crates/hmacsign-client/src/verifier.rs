//! Verification of signed responses.
//!
//! A 2xx response must carry `HMAC-Authentication: version:digest`, where
//! `digest` is the engine's message digest over the complete body.
//!
//! Streamed bodies are returned unverified: hashing them would consume the
//! stream before the caller sees it. Callers that enable streaming accept
//! that the body's integrity is not checked.

use hmacsign_auth::{AuthError, AuthHeaderValue, CryptoEngine};
use hmacsign_core::Purpose;
use tracing::debug;

use crate::error::HmacError;
use crate::headers::AUTH_HEADER;
use crate::transport::ClientResponse;

/// Verify the authentication header of a successful response.
///
/// # Errors
///
/// Returns [`HmacError::Authentication`] if the header is missing or the
/// digest does not match, and [`HmacError::Protocol`] if the header is
/// malformed or carries a foreign version.
pub fn verify_response(
    engine: &dyn CryptoEngine,
    response: &ClientResponse,
) -> Result<(), HmacError> {
    let Some(body) = response.bytes() else {
        debug!(status = %response.status(), "skipping HMAC verification of streamed response");
        return Ok(());
    };

    let header = response
        .header_str(AUTH_HEADER)
        .ok_or(AuthError::MissingHeader("response"))?;
    let parsed = AuthHeaderValue::parse_message(header)?;

    engine.validate(body, parsed.digest(), Purpose::Message)?;
    debug!(status = %response.status(), body_len = body.len(), "verified HMAC response");
    Ok(())
}
