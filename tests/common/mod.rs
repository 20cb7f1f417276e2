//! Shared helpers for HTTP-level tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use serde_json::Map;
use tablerest::{App, Identity, TokenVerifier, VerifyError};
use tower::ServiceExt;

pub const GOOD_TOKEN: &str = "valid-token";

/// Accepts exactly [`GOOD_TOKEN`].
pub struct StaticVerifier;

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        if token == GOOD_TOKEN {
            Ok(Identity {
                subject: "test-user".into(),
                claims: Map::new(),
            })
        } else {
            Err(VerifyError::Rejected("unknown token".into()))
        }
    }
}

pub fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        b = b.header("Authorization", format!("Bearer {}", t));
    }
    match body {
        Some(json) => b
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => b.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: &App, req: Request<Body>) -> (StatusCode, String) {
    let response: Response<Body> = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}
