use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use posthub_auth::AuthPipeline;

use crate::context::PrincipalContext;
use crate::cookies;

#[derive(Clone)]
pub struct AuthState {
    pub pipeline: Arc<AuthPipeline>,
}

/// Resolve the session token into a [`PrincipalContext`] or reject with 401.
///
/// The token is taken from the `Authorization: Bearer` header when present,
/// falling back to the `ACCESS_TOKEN` cookie.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = session_token(req.headers()).ok_or(StatusCode::UNAUTHORIZED)?;

    let principal = state
        .pipeline
        .authenticate(&token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(PrincipalContext::new(principal));

    Ok(next.run(req).await)
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer(headers) {
        return Some(token.to_string());
    }
    cookies::read_cookie(headers, cookies::ACCESS_TOKEN)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}
