//! Bridges async handlers to the synchronous service layer.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;

use marketplace_core::DomainError;
use marketplace_infra::Marketplace;

use crate::app::errors;

pub type AppServices = Marketplace;

/// Run a service call on the blocking pool.
///
/// Services may block on locks or on the database, so they never run on a
/// runtime worker.
pub async fn blocking<T, F>(services: &Arc<AppServices>, call: F) -> Result<T, Response>
where
    F: FnOnce(&AppServices) -> Result<T, DomainError> + Send + 'static,
    T: Send + 'static,
{
    let services = Arc::clone(services);
    match tokio::task::spawn_blocking(move || call(&services)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(errors::domain_error_to_response(err)),
        Err(join_err) => {
            tracing::error!(error = %join_err, "service call aborted");
            Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "service call aborted",
            ))
        }
    }
}
