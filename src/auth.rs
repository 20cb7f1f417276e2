//! Access gate: bearer-token middleware backed by an external identity provider.
//!
//! Every request except CORS preflight must carry `Authorization: Bearer <token>`.
//! The token is handed to a [`TokenVerifier`]; on success the verified [`Identity`]
//! is inserted into request extensions, otherwise the request is answered with
//! 403 `Unauthorized` and never reaches a handler. Verification details are logged,
//! never returned to the caller.

use crate::error::AppError;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::http::{header, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Verified claims of the caller, available to handlers via the extractor impl.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Identity {
    /// Issuer-asserted subject identifier.
    #[serde(rename = "sub")]
    pub subject: String,
    /// All other claims as returned by the identity provider.
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("identity provider rejected token: {0}")]
    Rejected(String),
    #[error("identity provider unreachable: {0}")]
    Transport(String),
    #[error("malformed claims: {0}")]
    Malformed(String),
}

/// External identity collaborator.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}

/// Verifies tokens by presenting them to an OIDC-style userinfo endpoint.
/// A 2xx JSON response carrying `sub` counts as verified claims.
pub struct UserInfoVerifier {
    client: reqwest::Client,
    url: String,
}

impl UserInfoVerifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(UserInfoVerifier { client, url: url.into() })
    }
}

#[async_trait]
impl TokenVerifier for UserInfoVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let resp = self
            .client
            .get(&self.url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| VerifyError::Transport(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(VerifyError::Rejected(format!("status {}", status.as_u16())));
        }
        let identity: Identity = resp
            .json()
            .await
            .map_err(|e| VerifyError::Malformed(e.to_string()))?;
        if identity.subject.is_empty() {
            return Err(VerifyError::Malformed("empty sub".into()));
        }
        Ok(identity)
    }
}

/// Shared handle the middleware is built with.
pub type SharedVerifier = Arc<dyn TokenVerifier>;

/// Token part of a `Bearer <token>` header value. None for any other scheme or an empty token.
fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Middleware: attach [`Identity`] or short-circuit with 403.
pub async fn require_identity(State(verifier): State<SharedVerifier>, mut request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let token = match header_value.and_then(bearer_token) {
        Some(t) => t.to_string(),
        None => {
            tracing::warn!(
                path = %request.uri().path(),
                "no bearer token in Authorization header; expected `Authorization: Bearer <token>`"
            );
            return AppError::Unauthorized.into_response();
        }
    };

    match verifier.verify(&token).await {
        Ok(identity) => {
            tracing::debug!(subject = %identity.subject, "token verified");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %request.uri().path(), "token verification failed");
            AppError::Unauthorized.into_response()
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
