//! Session-start exchange.
//!
//! The handshake request is a bodiless copy of the first outgoing request,
//! marked with `HMAC-Authentication-Session: Start` and signed like a
//! standalone request. The server answers with
//! `HMAC-Authentication: version:sessionNonce:digest`; once the digest over
//! the session nonce validates, the nonce is handed to the engine and the
//! engine is told the session has started.

use hmacsign_auth::{AuthHeaderValue, CryptoEngine};
use hmacsign_core::{HmacClientConfig, Purpose};
use http::StatusCode;
use tracing::{debug, info};

use crate::error::HmacError;
use crate::headers::AUTH_HEADER;
use crate::remote_error;
use crate::signer;
use crate::transport::{ClientRequest, Transport};

/// Run the handshake for `request` through `transport`.
///
/// On error the engine's session state is left untouched.
///
/// # Errors
///
/// - [`HmacError::Protocol`] if the answer has no authentication header, the
///   wrong number of fields, or a foreign version.
/// - [`HmacError::Authentication`] if the server's digest does not validate,
///   or the server answered 401.
/// - [`HmacError::Transport`] if the exchange itself failed.
pub async fn start_session<T: Transport + ?Sized>(
    transport: &T,
    engine: &mut dyn CryptoEngine,
    request: &ClientRequest,
    config: &HmacClientConfig,
) -> Result<(), HmacError> {
    let mut session_request = request.clone_for_session_start();
    signer::sign_request(engine, &mut session_request)?;

    debug!(uri = %session_request.uri(), "sending HMAC session start");
    let response = transport.send(session_request).await?;

    if response.status() == StatusCode::UNAUTHORIZED {
        return Err(remote_error::from_unauthorized(response, true, config).await);
    }

    let header = response.header_str(AUTH_HEADER).ok_or_else(|| {
        HmacError::Protocol("authentication missing from session start response".to_owned())
    })?;

    let (session_nonce, digest) = AuthHeaderValue::session_start_fields(header)?;

    engine.validate(
        session_nonce.as_str().as_bytes(),
        &digest,
        Purpose::SessionResponse,
    )?;

    engine.record_session_nonce(&session_nonce);
    engine.mark_session_started();
    info!(key_id = %engine.key_id(), "HMAC session established");
    Ok(())
}
