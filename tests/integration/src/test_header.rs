//! Single-shot header signing tests.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hmacsign_auth::HmacSha256Engine;
    use hmacsign_client::headers::AUTH_HEADER;
    use hmacsign_client::{ClientRequest, HmacError};
    use hmacsign_core::KeyId;
    use http::{Method, StatusCode};
    use tokio_test::{assert_err, assert_ok};

    use crate::{EmulatedServer, client_for, single_shot_engine};

    #[tokio::test]
    async fn test_should_exchange_signed_request_and_response() {
        let server = Arc::new(EmulatedServer::new());
        let mut client = client_for(&server, single_shot_engine());

        let request = ClientRequest::parse(Method::POST, "http://api.local/items?page=2")
            .unwrap()
            .with_body(r#"{"name":"widget"}"#);
        let response = assert_ok!(client.send(request).await);

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.bytes().unwrap()).unwrap();
        assert_eq!(body["method"], "POST");
        assert_eq!(body["uri"], "http://api.local/items?page=2");
        assert_eq!(body["body"], r#"{"name":"widget"}"#);
        assert_eq!(client.message_count(), 1);
    }

    #[tokio::test]
    async fn test_should_send_four_field_header() {
        let server = Arc::new(EmulatedServer::new());
        let mut client = client_for(&server, single_shot_engine());

        let request = ClientRequest::parse(Method::GET, "http://api.local/a").unwrap();
        assert_ok!(client.send(request).await);

        let sent = server.requests();
        let value = sent[0].headers().get(AUTH_HEADER).unwrap().to_str().unwrap();
        let fields: Vec<&str> = value.split(':').collect();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], "1");
        assert_eq!(fields[1], "app");
        assert_eq!(fields[3].len(), 64);
    }

    #[tokio::test]
    async fn test_should_allow_only_one_message_per_single_shot_client() {
        let server = Arc::new(EmulatedServer::new());
        let mut client = client_for(&server, single_shot_engine());

        let first = ClientRequest::parse(Method::GET, "http://api.local/a").unwrap();
        assert_ok!(client.send(first).await);

        let second = ClientRequest::parse(Method::GET, "http://api.local/b").unwrap();
        let err = assert_err!(client.send(second).await);
        assert!(matches!(err, HmacError::ProtocolViolation(_)));
        assert_eq!(server.calls(), 1);
    }

    #[tokio::test]
    async fn test_should_surface_remote_detail_for_unknown_key() {
        let server = Arc::new(EmulatedServer::new());
        let engine = HmacSha256Engine::new(KeyId::new("stranger"), "whatever");
        let mut client = client_for(&server, Box::new(engine));

        let request = ClientRequest::parse(Method::GET, "http://api.local/a").unwrap();
        let err = assert_err!(client.send(request).await);
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.to_string().contains("unknown HMAC key"));
        assert_eq!(client.message_count(), 0);
    }
}
