//! Attaching authentication data to outgoing requests.
//!
//! Three forms exist, all signing the canonical input from
//! [`hmacsign_auth::canonical`]:
//!
//! - [`sign_request`]: `HMAC-Authentication: version:keyId:nonce:digest` over
//!   `method ∥ uri ∥ body`. Used for single-shot requests and the handshake.
//! - [`sign_uri`]: the same tuple as the `hmacauthentication` query
//!   parameter, signed over the URI and existing query string only.
//! - [`sign_session_message`]: `HMAC-Authentication: version:digest` over
//!   `method ∥ uri ∥ body`, once a session is active.
//!
//! None of these touch the method or body.

use hmacsign_auth::canonical::{request_signing_input, signed_uri, uri_signing_input};
use hmacsign_auth::{AuthHeaderValue, CryptoEngine};
use hmacsign_core::{Purpose, URI_PARAM_NAME};
use http::HeaderValue;
use tracing::debug;

use crate::error::HmacError;
use crate::headers::AUTH_HEADER;
use crate::transport::ClientRequest;

/// Sign `request` with the 4-field header form.
///
/// # Errors
///
/// Returns [`HmacError::ProtocolViolation`] if the engine refuses to produce
/// a digest or the tuple is not a valid header value.
pub fn sign_request(
    engine: &dyn CryptoEngine,
    request: &mut ClientRequest,
) -> Result<(), HmacError> {
    let uri = request.uri_string();
    let input = request_signing_input(request.method().as_str(), &uri, request.body());
    let digest = engine.compute_digest(&input, Purpose::Request)?;

    let value = AuthHeaderValue::request(
        engine.key_id().clone(),
        engine.current_nonce().clone(),
        digest,
    );
    debug!(method = %request.method(), uri, key_id = %engine.key_id(), "signed HMAC request");

    request.headers_mut().insert(AUTH_HEADER, header_value(&value)?);
    Ok(())
}

/// Sign `request` with the 2-field session form.
///
/// # Errors
///
/// Returns [`HmacError::ProtocolViolation`] if the engine has no active session.
pub fn sign_session_message(
    engine: &dyn CryptoEngine,
    request: &mut ClientRequest,
) -> Result<(), HmacError> {
    let uri = request.uri_string();
    let input = request_signing_input(request.method().as_str(), &uri, request.body());
    let digest = engine.compute_digest(&input, Purpose::Message)?;

    let value = AuthHeaderValue::message(digest);
    debug!(method = %request.method(), uri, "signed HMAC session message");

    request.headers_mut().insert(AUTH_HEADER, header_value(&value)?);
    Ok(())
}

/// Add the `hmacauthentication` query parameter to `request` and return the
/// resulting URI.
///
/// The caller is responsible for caching: calling this twice on the same
/// request would sign the first parameter into the second.
///
/// # Errors
///
/// Returns [`HmacError::ProtocolViolation`] if the engine refuses to produce
/// a digest.
pub fn sign_uri(engine: &dyn CryptoEngine, request: &mut ClientRequest) -> Result<String, HmacError> {
    let uri = request.uri_string();
    let input = uri_signing_input(&uri, &request.query_string());
    let digest = engine.compute_digest(input.as_bytes(), Purpose::Request)?;

    let value = AuthHeaderValue::request(
        engine.key_id().clone(),
        engine.current_nonce().clone(),
        digest,
    );
    request.set_query_param(URI_PARAM_NAME, value.to_string());

    let signed = signed_uri(&uri, &request.query_string());
    debug!(signing_input = %input, signed_uri = %signed, "signed HMAC URI");
    Ok(signed)
}

fn header_value(value: &AuthHeaderValue) -> Result<HeaderValue, HmacError> {
    HeaderValue::from_str(&value.to_string()).map_err(|_| {
        HmacError::ProtocolViolation(
            "HMAC authentication tuple is not a valid header value".to_owned(),
        )
    })
}
