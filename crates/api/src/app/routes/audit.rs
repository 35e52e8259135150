use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use marketplace_audit::AuditService;

use crate::app::routes::admin_only;
use crate::app::services::{self, AppServices};

/// Full audit trail, oldest first. Administrators only.
pub async fn list_entries(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    if let Err(resp) = admin_only(&services) {
        return resp;
    }

    match services::blocking(&services, |s| Ok(s.audit.history()?)).await {
        Ok(entries) => {
            let body: Vec<_> = entries
                .into_iter()
                .map(|entry| {
                    let line = entry.to_string();
                    serde_json::json!({
                        "recorded_at": entry.recorded_at,
                        "actor": entry.actor,
                        "action": entry.action,
                        "line": line,
                    })
                })
                .collect();
            Json(body).into_response()
        }
        Err(resp) => resp,
    }
}
