//! Interpretation of remote 401 responses.
//!
//! HMAC-aware servers answer authentication failures with
//!
//! ```json
//! { "detail": "...", "hmac": "HMACSession", "version": "1" }
//! ```
//!
//! where `hmac` and `version` are optional. The detail is surfaced to the
//! caller. When it is one of the "no session" phrases, a hint is appended
//! whose wording depends on whether this client can hold a session at all.
//! Bodies that are not such JSON are surfaced verbatim.

use bytes::Bytes;
use hmacsign_core::HmacClientConfig;
use http::StatusCode;
use serde::Deserialize;
use tracing::warn;

use crate::error::HmacError;
use crate::transport::ClientResponse;

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    detail: String,
    #[serde(default)]
    hmac: Option<String>,
    #[serde(default)]
    version: Option<serde_json::Value>,
}

/// Turn a 401 response into an [`HmacError::Authentication`].
///
/// A streamed body is drained first. Any failure while reading it leaves the
/// detail empty; the call still fails with status 401.
pub async fn from_unauthorized(
    response: ClientResponse,
    session_capable: bool,
    config: &HmacClientConfig,
) -> HmacError {
    let body = match response.into_bytes().await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "failed to read 401 response body");
            Bytes::new()
        }
    };

    let detail = describe(&body, session_capable, config);
    warn!(detail, session_capable, "remote HMAC authentication failed");

    HmacError::Authentication {
        message: format!("remote HMAC error: {detail}"),
        status: Some(StatusCode::UNAUTHORIZED),
    }
}

/// Compose the detail text for a 401 body.
#[must_use]
pub fn describe(body: &[u8], session_capable: bool, config: &HmacClientConfig) -> String {
    let Ok(parsed) = serde_json::from_slice::<RemoteErrorBody>(body) else {
        return String::from_utf8_lossy(body).into_owned();
    };

    let mut detail = parsed.detail;

    if config.is_session_required_detail(&detail) {
        let hint = if session_capable {
            &config.session_expired_hint
        } else {
            &config.session_required_hint
        };
        detail.push_str(" (");
        detail.push_str(hint);
        detail.push(')');
    }

    if let Some(hmac) = parsed.hmac {
        let version = match parsed.version {
            Some(serde_json::Value::String(v)) => v,
            Some(other) => other.to_string(),
            None => String::new(),
        };
        detail.push_str(&format!(" [{hmac} v{version}]"));
    }

    detail
}
