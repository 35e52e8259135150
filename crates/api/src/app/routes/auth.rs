use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use marketplace_auth::AuthService;
use marketplace_core::DomainError;

use crate::app::services::{self, AppServices};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let outcome = services::blocking(&services, move |s| {
        s.auth.login(&body.username, &body.password)
    })
    .await;

    match outcome {
        Ok(Some(user)) => Json(dto::UserResponse::from(user)).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "unknown user or wrong password",
        ),
        Err(resp) => resp,
    }
}

pub async fn logout(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services::blocking(&services, |s| s.auth.logout()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}

pub async fn me(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.auth.current_user() {
        Some(user) => Json(dto::UserResponse::from(user)).into_response(),
        None => errors::domain_error_to_response(DomainError::Unauthenticated),
    }
}
