//! Response verification and remote error tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use hmacsign_client::{ClientRequest, HmacError};
    use hmacsign_core::HmacClientConfig;
    use http::{Method, StatusCode};
    use tokio_test::{assert_err, assert_ok};

    use crate::{EmulatedServer, client_for, session_engine, single_shot_engine};

    fn get() -> ClientRequest {
        ClientRequest::parse(Method::GET, "http://api.local/a").unwrap()
    }

    #[tokio::test]
    async fn test_should_reject_tampered_response_body() {
        let server = Arc::new(EmulatedServer::new());
        server.tamper_response.store(true, Ordering::SeqCst);
        let mut client = client_for(&server, single_shot_engine());

        let err = assert_err!(client.send(get()).await);
        assert!(matches!(err, HmacError::Authentication { .. }));
        assert_eq!(client.message_count(), 0);
    }

    #[tokio::test]
    async fn test_should_reject_response_without_signature() {
        let server = Arc::new(EmulatedServer::new());
        server.omit_response_header.store(true, Ordering::SeqCst);
        let mut client = client_for(&server, session_engine());

        let err = assert_err!(client.send(get()).await);
        assert!(matches!(err, HmacError::Authentication { .. }));
        assert!(err.to_string().contains("response"));
    }

    #[tokio::test]
    async fn test_should_accept_streamed_response_without_verification() {
        let server = Arc::new(EmulatedServer::new());
        server.stream_response.store(true, Ordering::SeqCst);
        let mut client = client_for(&server, single_shot_engine());

        let response = assert_ok!(client.send(get()).await);
        assert!(response.is_streamed());
        let body = assert_ok!(response.into_bytes().await);
        assert!(!body.is_empty());
    }

    #[tokio::test]
    async fn test_should_hint_that_server_requires_session() {
        let server = Arc::new(EmulatedServer::new());
        server.require_session.store(true, Ordering::SeqCst);
        let mut client = client_for(&server, single_shot_engine());

        let err = assert_err!(client.send(get()).await);
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert_eq!(
            err.to_string(),
            "authentication error: remote HMAC error: HMAC Authentication required \
             (server requires HMAC session) [HMACSession v1]"
        );
    }

    #[tokio::test]
    async fn test_should_use_configured_hints() {
        let server = Arc::new(EmulatedServer::new());
        server.require_session.store(true, Ordering::SeqCst);
        let config = HmacClientConfig::default().with_hints("renew it", "use a session engine");
        let mut client = hmacsign_client::HmacHttpClient::with_config(Arc::clone(&server), config);
        client.set_engine(single_shot_engine());

        let err = assert_err!(client.send(get()).await);
        assert!(err.to_string().contains("(use a session engine)"));
    }
}
