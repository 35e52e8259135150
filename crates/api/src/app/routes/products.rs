use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use marketplace_catalog::CatalogService;
use marketplace_core::{DomainError, ProductId};

use crate::app::routes::admin_only;
use crate::app::services::{self, AppServices};
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(replace_product).delete(delete_product),
        )
}

fn parse_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse::<ProductId>()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}

/// Lists the catalog, or searches it (through the cache) when any filter is set.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ProductQuery>,
) -> axum::response::Response {
    let criteria = match query.criteria() {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let found = services::blocking(&services, move |s| {
        if criteria.is_unrestricted() {
            s.catalog.get_all()
        } else {
            s.catalog.search(&criteria)
        }
    })
    .await;

    match found {
        Ok(products) => Json(products).into_response(),
        Err(resp) => resp,
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match services::blocking(&services, move |s| s.catalog.get_by_id(id)).await {
        Ok(Some(product)) => Json(product).into_response(),
        Ok(None) => errors::domain_error_to_response(DomainError::NotFound),
        Err(resp) => resp,
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::ProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = admin_only(&services) {
        return resp;
    }
    let product = match body.into_product() {
        Ok(p) => p,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services::blocking(&services, move |s| s.catalog.add(product)).await {
        Ok(saved) => (StatusCode::CREATED, Json(saved)).into_response(),
        Err(resp) => resp,
    }
}

pub async fn replace_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::ProductRequest>,
) -> axum::response::Response {
    if let Err(resp) = admin_only(&services) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let product = match body.into_product() {
        Ok(p) => p.with_id(id),
        Err(e) => return errors::domain_error_to_response(e),
    };

    let updated = services::blocking(&services, move |s| {
        if s.catalog.get_by_id(id)?.is_none() {
            return Err(DomainError::NotFound);
        }
        s.catalog.update(product)
    })
    .await;

    match updated {
        Ok(saved) => Json(saved).into_response(),
        Err(resp) => resp,
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = admin_only(&services) {
        return resp;
    }
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    let removed = services::blocking(&services, move |s| {
        if s.catalog.get_by_id(id)?.is_none() {
            return Err(DomainError::NotFound);
        }
        s.catalog.remove(id)
    })
    .await;

    match removed {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(resp) => resp,
    }
}
