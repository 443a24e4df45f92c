use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use posthub_core::IamError;

pub fn iam_error_to_response(err: IamError) -> axum::response::Response {
    let message = err.to_string();
    match err {
        IamError::NotFound(_) => json_error(StatusCode::NOT_FOUND, "not_found", message),
        IamError::DataExists(_) => json_error(StatusCode::CONFLICT, "data_exists", message),
        IamError::InvalidData(_) => json_error(StatusCode::BAD_REQUEST, "invalid_data", message),
        IamError::InvalidPassword(_) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_password", message)
        }
        IamError::InvalidCredentials => {
            json_error(StatusCode::UNAUTHORIZED, "authentication_failed", message)
        }
        IamError::TokenMalformed | IamError::TooOldToRefresh => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_token", message)
        }
        IamError::AccessDenied => json_error(StatusCode::FORBIDDEN, "access_denied", message),
        IamError::Store(_) => {
            tracing::error!(error = %message, "storage failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", "internal error")
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
