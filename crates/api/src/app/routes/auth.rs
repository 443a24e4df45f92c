//! Session endpoints: login, register, refresh, logout.

use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};

use posthub_auth::{AuthSession, RegistrationRequest};

use crate::app::dto::{LoginRequest, RegisterRequest, SessionProfile};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;
use crate::cookies;

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> Response {
    match services.pipeline.login(&body.email, &body.password).await {
        Ok(session) => session_response(&services, &session),
        Err(e) => errors::iam_error_to_response(e),
    }
}

/// POST /auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> Response {
    let request = RegistrationRequest {
        username: body.username,
        email: body.email,
        password: body.password,
        confirm_password: body.confirm_password,
    };
    match services.pipeline.register(&request).await {
        Ok(session) => session_response_with_status(&services, &session, StatusCode::CREATED),
        Err(e) => errors::iam_error_to_response(e),
    }
}

/// POST /auth/refresh/token
///
/// The refresh cookie alone redeems the session; the access token may be
/// long expired or absent. The response carries the replacement pair.
pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    headers: HeaderMap,
) -> Response {
    let Some(handle) = cookies::read_cookie(&headers, cookies::REFRESH_TOKEN) else {
        return errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Refresh token not found.",
        );
    };

    match services.pipeline.refresh(&handle).await {
        Ok(session) => session_response(&services, &session),
        Err(e) => errors::iam_error_to_response(e),
    }
}

/// POST /auth/logout
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
) -> Response {
    if let Err(e) = services.pipeline.logout(ctx.user_id()).await {
        return errors::iam_error_to_response(e);
    }

    let mut response = StatusCode::NO_CONTENT.into_response();
    for cookie in cookies::clearing_cookies() {
        append_cookie(&mut response, &cookie);
    }
    response
}

fn session_response(services: &AppServices, session: &AuthSession) -> Response {
    session_response_with_status(services, session, StatusCode::OK)
}

fn session_response_with_status(
    services: &AppServices,
    session: &AuthSession,
    status: StatusCode,
) -> Response {
    let mut response = (status, Json(SessionProfile::from(session))).into_response();
    let validity = services.pipeline.codec().validity();
    append_cookie(&mut response, &cookies::access_cookie(&session.access_token, validity));
    append_cookie(&mut response, &cookies::refresh_cookie(&session.refresh_token));
    response
}

fn append_cookie(response: &mut Response, cookie: &str) {
    if let Ok(value) = HeaderValue::from_str(cookie) {
        response.headers_mut().append(SET_COOKIE, value);
    }
}
