use axum::response::Response;
use axum::{Router, routing::get};

use marketplace_auth::User;

use crate::app::errors;
use crate::app::services::AppServices;

pub mod audit;
pub mod auth;
pub mod products;
pub mod system;

/// Router for every endpoint except health.
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .route("/audit", get(audit::list_entries))
}

/// Gate for mutating endpoints: 401 without a session, 403 for non-admins.
pub(crate) fn admin_only(services: &AppServices) -> Result<User, Response> {
    marketplace_auth::require_admin(&*services.auth).map_err(errors::domain_error_to_response)
}
