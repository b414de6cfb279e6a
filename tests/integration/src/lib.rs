//! End-to-end tests for the hmacsign client.
//!
//! [`EmulatedServer`] is an in-process [`Transport`] that plays the server
//! side of the protocol with the reference engines: it validates incoming
//! signatures, runs the session handshake and signs its responses. Knobs let
//! a test make it misbehave.
//!
//! Run them with:
//! ```text
//! cargo test -p hmacsign-integration
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use bytes::Bytes;
use hmacsign_auth::canonical::{encode_query, request_signing_input, uri_signing_input};
use hmacsign_auth::{
    AuthHeaderValue, CryptoEngine, HmacSha256Engine, HmacSha256SessionEngine, KeyProvider,
    StaticKeyProvider,
};
use hmacsign_client::headers::{AUTH_HEADER, SESSION_HEADER};
use hmacsign_client::{
    ClientRequest, ClientResponse, HmacHttpClient, ResponseBody, Transport, TransportError,
};
use hmacsign_core::{KeyId, Nonce, Purpose, SESSION_START_VALUE, URI_PARAM_NAME};
use http::{HeaderMap, HeaderValue, StatusCode};
use tracing::debug;

/// Key id known to every emulated server.
pub const KEY_ID: &str = "app";
/// Secret for [`KEY_ID`].
pub const SECRET: &str = "integration-secret";

/// Detail the server sends when a session is required but absent.
pub const DETAIL_SESSION_REQUIRED: &str = "HMAC Authentication required";
/// Detail the server sends when a session message arrives without a session.
pub const DETAIL_SESSION_NOT_STARTED: &str = "5 - Sessão HMAC não iniciada";

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// An in-process HMAC-Authentication server.
#[derive(Debug)]
pub struct EmulatedServer {
    keys: StaticKeyProvider,
    session: Mutex<Option<HmacSha256SessionEngine>>,
    requests: Mutex<Vec<ClientRequest>>,
    calls: AtomicUsize,
    /// Refuse single-shot requests with the "session required" detail.
    pub require_session: AtomicBool,
    /// Alter the body after signing the response.
    pub tamper_response: AtomicBool,
    /// Leave the authentication header off signed responses.
    pub omit_response_header: AtomicBool,
    /// Answer with an unsigned streamed body.
    pub stream_response: AtomicBool,
    /// Answer the handshake with a digest over the wrong session nonce.
    pub forge_handshake: AtomicBool,
}

impl Default for EmulatedServer {
    fn default() -> Self {
        Self::new()
    }
}

impl EmulatedServer {
    /// Create a well-behaved server that knows [`KEY_ID`].
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        Self {
            keys: StaticKeyProvider::new(vec![(KEY_ID.to_owned(), SECRET.to_owned())]),
            session: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            require_session: AtomicBool::new(false),
            tamper_response: AtomicBool::new(false),
            omit_response_header: AtomicBool::new(false),
            stream_response: AtomicBool::new(false),
            forge_handshake: AtomicBool::new(false),
        }
    }

    /// Number of requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ClientRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Forget the current session, as a server restart would.
    pub fn expire_session(&self) {
        *self.session.lock().unwrap() = None;
    }

    /// Whether a session has been established.
    pub fn has_session(&self) -> bool {
        self.session.lock().unwrap().is_some()
    }

    fn handle(&self, request: &ClientRequest) -> ClientResponse {
        let is_start = request
            .headers()
            .get(SESSION_HEADER)
            .is_some_and(|v| v == SESSION_START_VALUE);
        let header = request
            .headers()
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(ToOwned::to_owned);

        match header {
            Some(value) if is_start => self.start_session(request, &value),
            Some(value) if value.split(':').count() == 2 => self.session_message(request, &value),
            Some(value) => self.single_shot(request, &value, &header_input(request)),
            None => match uri_credentials(request) {
                Some((value, input)) => self.single_shot(request, &value, input.as_bytes()),
                None => unauthorized(DETAIL_SESSION_REQUIRED, None),
            },
        }
    }

    fn start_session(&self, request: &ClientRequest, value: &str) -> ClientResponse {
        let Some((key_id, nonce, digest)) = request_fields(value) else {
            return unauthorized("malformed HMAC header", None);
        };
        let Ok(secret) = self.keys.get_secret(&key_id) else {
            return unauthorized("unknown HMAC key", None);
        };

        let mut engine = HmacSha256SessionEngine::with_nonce(key_id, secret, nonce);
        if engine
            .validate(&header_input(request), &digest, Purpose::Request)
            .is_err()
        {
            return unauthorized("HMAC signature mismatch", None);
        }

        let session_nonce = Nonce::new(uuid::Uuid::new_v4().simple().to_string());
        let signed_nonce = if self.forge_handshake.load(Ordering::SeqCst) {
            "forged"
        } else {
            session_nonce.as_str()
        };
        let Ok(answer) = engine.compute_digest(signed_nonce.as_bytes(), Purpose::SessionResponse)
        else {
            return unauthorized("HMAC session could not start", None);
        };

        engine.record_session_nonce(&session_nonce);
        engine.mark_session_started();
        *self.session.lock().unwrap() = Some(engine);
        debug!(session_nonce = %session_nonce, "emulated server started session");

        let value = AuthHeaderValue::session_start(session_nonce, answer).to_string();
        with_auth_header(StatusCode::OK, &value, Bytes::new())
    }

    fn session_message(&self, request: &ClientRequest, value: &str) -> ClientResponse {
        let mut session = self.session.lock().unwrap();
        let Some(engine) = session.as_mut() else {
            return unauthorized(DETAIL_SESSION_NOT_STARTED, Some("HMACSession"));
        };
        let Ok(parsed) = AuthHeaderValue::parse_message(value) else {
            return unauthorized("malformed HMAC header", None);
        };
        if engine
            .validate(&header_input(request), parsed.digest(), Purpose::Message)
            .is_err()
        {
            return unauthorized("HMAC signature mismatch", Some("HMACSession"));
        }

        let response = self.signed_response(&*engine, request);
        engine.advance_message();
        response
    }

    fn single_shot(&self, request: &ClientRequest, value: &str, input: &[u8]) -> ClientResponse {
        if self.require_session.load(Ordering::SeqCst) {
            return unauthorized(DETAIL_SESSION_REQUIRED, Some("HMACSession"));
        }
        let Some((key_id, nonce, digest)) = request_fields(value) else {
            return unauthorized("malformed HMAC header", None);
        };
        let Ok(secret) = self.keys.get_secret(&key_id) else {
            return unauthorized("unknown HMAC key", None);
        };

        let engine = HmacSha256Engine::with_nonce(key_id, secret, nonce);
        if engine.validate(input, &digest, Purpose::Request).is_err() {
            return unauthorized("HMAC signature mismatch", None);
        }
        self.signed_response(&engine, request)
    }

    fn signed_response(&self, engine: &dyn CryptoEngine, request: &ClientRequest) -> ClientResponse {
        let body = Bytes::from(
            serde_json::json!({
                "method": request.method().as_str(),
                "uri": request.uri_string(),
                "body": String::from_utf8_lossy(request.body()),
            })
            .to_string(),
        );

        if self.stream_response.load(Ordering::SeqCst) {
            let chunks: Vec<Result<Bytes, TransportError>> = vec![Ok(body)];
            return ClientResponse::new(
                StatusCode::OK,
                HeaderMap::new(),
                ResponseBody::Streamed(Box::pin(futures::stream::iter(chunks))),
            );
        }

        let Ok(digest) = engine.compute_digest(&body, Purpose::Message) else {
            return unauthorized("HMAC session not started", None);
        };
        let body = if self.tamper_response.load(Ordering::SeqCst) {
            Bytes::from_static(b"{\"tampered\":true}")
        } else {
            body
        };

        if self.omit_response_header.load(Ordering::SeqCst) {
            return ClientResponse::buffered(StatusCode::OK, HeaderMap::new(), body);
        }
        with_auth_header(
            StatusCode::OK,
            &AuthHeaderValue::message(digest).to_string(),
            body,
        )
    }
}

#[async_trait]
impl Transport for EmulatedServer {
    async fn send(&self, request: ClientRequest) -> Result<ClientResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.handle(&request);
        self.requests.lock().unwrap().push(request);
        Ok(response)
    }
}

/// A client wired to `server` with the given engine.
pub fn client_for(
    server: &Arc<EmulatedServer>,
    engine: Box<dyn CryptoEngine>,
) -> HmacHttpClient<Arc<EmulatedServer>> {
    let mut client = HmacHttpClient::new(Arc::clone(server));
    client.set_engine(engine);
    client
}

/// A fresh single-shot engine for [`KEY_ID`].
#[must_use]
pub fn single_shot_engine() -> Box<dyn CryptoEngine> {
    Box::new(HmacSha256Engine::new(KeyId::new(KEY_ID), SECRET))
}

/// A fresh session engine for [`KEY_ID`].
#[must_use]
pub fn session_engine() -> Box<dyn CryptoEngine> {
    Box::new(HmacSha256SessionEngine::new(KeyId::new(KEY_ID), SECRET))
}

fn header_input(request: &ClientRequest) -> Vec<u8> {
    request_signing_input(request.method().as_str(), &request.uri_string(), request.body())
}

/// The credential tuple from the query and the URI it was signed over.
fn uri_credentials(request: &ClientRequest) -> Option<(String, String)> {
    let value = request
        .query()
        .iter()
        .find(|(k, _)| k == URI_PARAM_NAME)
        .map(|(_, v)| v.clone())?;
    let rest = encode_query(
        request
            .query()
            .iter()
            .filter(|(k, _)| k != URI_PARAM_NAME)
            .map(|(k, v)| (k.as_str(), v.as_str())),
    );
    Some((value, uri_signing_input(&request.uri_string(), &rest)))
}

fn request_fields(value: &str) -> Option<(KeyId, Nonce, String)> {
    match AuthHeaderValue::parse_request(value).ok()? {
        AuthHeaderValue::Request {
            key_id,
            nonce,
            digest,
            ..
        } => Some((key_id, nonce, digest)),
        _ => None,
    }
}

fn with_auth_header(status: StatusCode, value: &str, body: Bytes) -> ClientResponse {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(value) {
        headers.insert(AUTH_HEADER, value);
    }
    ClientResponse::buffered(status, headers, body)
}

fn unauthorized(detail: &str, hmac: Option<&str>) -> ClientResponse {
    let body = match hmac {
        Some(hmac) => serde_json::json!({ "detail": detail, "hmac": hmac, "version": 1 }),
        None => serde_json::json!({ "detail": detail }),
    };
    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    ClientResponse::buffered(StatusCode::UNAUTHORIZED, headers, body.to_string())
}

mod test_errors;
mod test_header;
