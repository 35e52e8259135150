//! PostgreSQL-backed stores.
//!
//! The store traits are synchronous, but sqlx is async. Each call runs its
//! query on the ambient tokio runtime and blocks the calling thread until it
//! completes. Callers on a runtime worker are moved off it with
//! `block_in_place`, which requires the multi-threaded runtime.
//!
//! ## Error Mapping
//!
//! Every `sqlx::Error` becomes a `RepositoryError` tagged with the failing
//! operation and keeping the original error as its source. A missing runtime
//! is reported the same way.

use std::future::Future;

use marketplace_core::RepositoryError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio::runtime::Handle;

mod audit;
mod products;
mod users;

pub use audit::PostgresAuditRepository;
pub use products::PostgresProductRepository;
pub use users::PostgresUserRepository;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id          BIGSERIAL PRIMARY KEY,
        name        TEXT   NOT NULL,
        category    TEXT   NOT NULL DEFAULT '',
        brand       TEXT   NOT NULL DEFAULT '',
        price_minor BIGINT NOT NULL CHECK (price_minor >= 0),
        stock       BIGINT NOT NULL CHECK (stock >= 0)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id       BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        role     TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS audit_log (
        id          BIGSERIAL PRIMARY KEY,
        recorded_at TIMESTAMPTZ NOT NULL,
        actor       TEXT NOT NULL,
        action      TEXT NOT NULL
    )
    "#,
];

/// Open a connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Create the `products`, `users` and `audit_log` tables when missing.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

/// Drive `fut` to completion from synchronous code.
fn run_blocking<F>(operation: &'static str, fut: F) -> Result<F::Output, RepositoryError>
where
    F: Future,
{
    let handle = Handle::try_current().map_err(|e| RepositoryError::new(operation, e))?;
    Ok(tokio::task::block_in_place(|| handle.block_on(fut)))
}

/// Map SQLx errors to `RepositoryError`.
fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) => {
            tracing::warn!(
                operation,
                code = db_err.code().as_deref().unwrap_or("unknown"),
                "database error"
            );
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            tracing::warn!(operation, "connection pool unavailable");
        }
        _ => {}
    }
    RepositoryError::new(operation, err)
}

/// Stored integers are signed; domain ones are not.
fn to_db<T>(operation: &'static str, value: T) -> Result<i64, RepositoryError>
where
    i64: TryFrom<T>,
    <i64 as TryFrom<T>>::Error: std::error::Error + Send + Sync + 'static,
{
    i64::try_from(value).map_err(|e| RepositoryError::new(operation, e))
}

fn from_db<T>(operation: &'static str, value: i64) -> Result<T, RepositoryError>
where
    T: TryFrom<i64>,
    <T as TryFrom<i64>>::Error: std::error::Error + Send + Sync + 'static,
{
    T::try_from(value).map_err(|e| RepositoryError::new(operation, e))
}
