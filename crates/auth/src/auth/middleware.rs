//! Request authentication middleware
//!
//! Buffers the request body, runs the configured authenticators and either
//! forwards the rebuilt request or answers with a uniform 401. The response
//! body is identical for every failure so callers cannot tell which check
//! rejected them; the specific reason goes to the log instead.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::State;
use axum::http::{Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use super::multi::MultiAuthenticator;
use super::{AuthError, Authenticator};

/// Shared state handed to [`require_auth`] via `from_fn_with_state`
#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<MultiAuthenticator>,
    pub max_body_bytes: usize,
}

/// Layer entry point: authenticate or answer 401
pub async fn require_auth(
    State(state): State<AuthState>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    match authenticate(&state, request).await {
        Ok(request) => next.run(request).await,
        Err(error) => {
            tracing::warn!(error = %error, "request authentication failed");
            unauthorized()
        }
    }
}

async fn authenticate(
    state: &AuthState,
    request: Request<Body>,
) -> Result<Request<Body>, AuthError> {
    let (parts, body) = request.into_parts();
    // Fail closed: an unreadable or oversized body rejects the request
    let bytes = to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|e| AuthError::BodyRead(e.to_string()))?;
    state.authenticator.verify(&parts, &bytes)?;
    Ok(Request::from_parts(parts, Body::from(bytes)))
}

fn unauthorized() -> Response<Body> {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": {
                "code": "UNAUTHORIZED",
                "message": "unauthorized"
            }
        })),
    )
        .into_response()
}
