//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: the wired services and the async-to-blocking bridge
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses
//!
//! The server holds a single session: one actor at a time, shared by every
//! client, as in the console front end it replaces.

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use marketplace_infra::Marketplace;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(marketplace: Marketplace) -> Router {
    let services: Arc<services::AppServices> = Arc::new(marketplace);

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use marketplace_infra::Repositories;
    use tower::ServiceExt; // for `oneshot`

    fn app() -> Router {
        let marketplace = Marketplace::wire(Repositories::in_memory()).unwrap();
        build_app(marketplace)
    }

    async fn status(app: Router, method: &str, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn health_is_public() {
        assert_eq!(status(app(), "GET", "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn mutations_need_a_session() {
        assert_eq!(status(app(), "POST", "/products").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(app(), "DELETE", "/products/1").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(app(), "GET", "/audit").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status(app(), "GET", "/auth/me").await, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn malformed_input_is_a_bad_request() {
        assert_eq!(status(app(), "GET", "/products/abc").await, StatusCode::BAD_REQUEST);
        assert_eq!(
            status(app(), "GET", "/products?minPrice=cheap").await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(app(), "GET", "/products/99").await, StatusCode::NOT_FOUND);
    }
}
