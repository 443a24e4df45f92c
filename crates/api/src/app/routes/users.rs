//! Account management endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use posthub_core::UserId;

use crate::app::dto::ChangePasswordRequest;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

/// PUT /users/:user_id/password
///
/// Owners change their own password; privileged roles may change anyone's.
pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<PrincipalContext>,
    Path(user_id): Path<i64>,
    Json(body): Json<ChangePasswordRequest>,
) -> Response {
    let result = services
        .pipeline
        .change_password(
            ctx.user_id(),
            UserId::from_raw(user_id),
            &body.new_password,
            &body.confirm_password,
        )
        .await;

    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::iam_error_to_response(e),
    }
}
