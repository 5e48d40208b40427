use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use tenantgate_auth::AuthError;
use tenantgate_core::DomainError;

/// Handler failure: either an auth outcome or a domain failure.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Auth(err) => auth_error_to_response(err),
            ApiError::Domain(err) => domain_error_to_response(err),
        }
    }
}

/// Map an auth outcome to a response without leaking verification details.
pub fn auth_error_to_response(err: AuthError) -> Response {
    match err {
        AuthError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "unauthenticated")
        }
        AuthError::PermissionDenied(kind) => {
            json_error(StatusCode::FORBIDDEN, "permission_denied", kind.to_string())
        }
        AuthError::Internal(detail) => {
            tracing::error!(%detail, "internal auth error");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal error")
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
    }
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
