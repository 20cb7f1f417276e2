//! UserInfoVerifier against a mock identity provider.

use std::time::Duration;
use tablerest::{TokenVerifier, UserInfoVerifier, VerifyError};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn verifier_for(server: &MockServer) -> UserInfoVerifier {
    UserInfoVerifier::new(format!("{}/userinfo", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn accepted_token_yields_claims() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("Authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sub": "uid-42",
            "email": "a@x.com"
        })))
        .mount(&server)
        .await;

    let identity = verifier_for(&server).await.verify("tok-1").await.unwrap();
    assert_eq!(identity.subject, "uid-42");
    assert_eq!(identity.claims["email"], "a@x.com");
}

#[tokio::test]
async fn provider_rejection_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let err = verifier_for(&server).await.verify("old").await.unwrap_err();
    assert!(matches!(err, VerifyError::Rejected(ref m) if m == "status 401"));
}

#[tokio::test]
async fn claims_without_subject_are_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"email": "a@x.com"})))
        .mount(&server)
        .await;

    let err = verifier_for(&server).await.verify("tok").await.unwrap_err();
    assert!(matches!(err, VerifyError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_provider_is_transport_error() {
    let verifier = UserInfoVerifier::new("http://127.0.0.1:1/userinfo", Duration::from_secs(2)).unwrap();
    let err = verifier.verify("tok").await.unwrap_err();
    assert!(matches!(err, VerifyError::Transport(_)));
}
