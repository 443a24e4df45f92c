use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::app::dto::UserProfile;
use crate::context::PrincipalContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(ctx): Extension<PrincipalContext>) -> impl IntoResponse {
    Json(UserProfile::from(ctx.principal()))
}
