use std::sync::Arc;

use chrono::{DateTime, Utc};
use marketplace_audit::{AuditEntry, AuditRepository};
use marketplace_core::RepositoryError;
use sqlx::{PgPool, Row};
use tracing::instrument;

use super::{map_sqlx_error, run_blocking};

/// Audit trail over the append-only `audit_log` table, read back in
/// insertion order.
#[derive(Debug, Clone)]
pub struct PostgresAuditRepository {
    pool: Arc<PgPool>,
}

impl PostgresAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self, entry), fields(actor = %entry.actor), err)]
    pub async fn append_async(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO audit_log (recorded_at, actor, action) VALUES ($1, $2, $3)")
            .bind(entry.recorded_at)
            .bind(&entry.actor)
            .bind(&entry.action)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("audit.append", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn find_all_async(&self) -> Result<Vec<AuditEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT recorded_at, actor, action FROM audit_log ORDER BY id")
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("audit.find_all", e))?;

        rows.iter()
            .map(|row| {
                let recorded_at: DateTime<Utc> = row
                    .try_get("recorded_at")
                    .map_err(|e| map_sqlx_error("audit.find_all", e))?;
                let actor: String = row
                    .try_get("actor")
                    .map_err(|e| map_sqlx_error("audit.find_all", e))?;
                let action: String = row
                    .try_get("action")
                    .map_err(|e| map_sqlx_error("audit.find_all", e))?;
                Ok(AuditEntry::new(recorded_at, actor, action))
            })
            .collect()
    }
}

impl AuditRepository for PostgresAuditRepository {
    fn append(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        run_blocking("audit.append", self.append_async(entry))?
    }

    fn find_all(&self) -> Result<Vec<AuditEntry>, RepositoryError> {
        run_blocking("audit.find_all", self.find_all_async())?
    }
}
