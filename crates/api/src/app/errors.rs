use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use marketplace_core::DomainError;

/// Map a service error onto the HTTP surface.
///
/// Storage faults are logged here and reported without detail.
pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Validation(violations) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "validation_error",
                "message": "request failed validation",
                "violations": violations,
            })),
        )
            .into_response(),
        DomainError::Unauthenticated => {
            json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "login required")
        }
        DomainError::Forbidden => {
            json_error(StatusCode::FORBIDDEN, "forbidden", "administrator role required")
        }
        DomainError::Repository(e) => {
            tracing::error!(operation = e.operation(), error = %e, "storage failure");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "internal storage error",
            )
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
