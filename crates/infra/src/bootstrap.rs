//! Service composition.
//!
//! Audit and authentication depend on each other: auth writes to the audit
//! trail, and audit asks auth who the current actor is. They are wired in a
//! fixed order so neither needs the other at construction time:
//!
//! 1. the audit service, bound to the trail only;
//! 2. the auth service, given the identity store and the audit service;
//! 3. auth bound into audit as its actor source;
//! 4. the catalog, given the product store and the audit service.

use std::sync::Arc;

use marketplace_audit::{AuditRepository, AuditServiceImpl, InMemoryAuditRepository, WiringError};
use marketplace_auth::{InMemoryUserRepository, Role, SessionAuthService, User, UserRepository};
use marketplace_catalog::{
    CatalogServiceImpl, InMemoryProductRepository, InstrumentedCatalog, ProductRepository,
};
use marketplace_core::DomainError;
use sqlx::PgPool;

use crate::postgres::{PostgresAuditRepository, PostgresProductRepository, PostgresUserRepository};

pub type Audit = AuditServiceImpl<Arc<dyn AuditRepository>>;
pub type Auth = SessionAuthService<Arc<dyn UserRepository>, Arc<Audit>>;
pub type Catalog = InstrumentedCatalog<CatalogServiceImpl<Arc<dyn ProductRepository>, Arc<Audit>>>;

/// The three durable stores the services sit on.
#[derive(Clone)]
pub struct Repositories {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub audit: Arc<dyn AuditRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        Self {
            products: Arc::new(InMemoryProductRepository::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            audit: Arc::new(InMemoryAuditRepository::new()),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self {
            products: Arc::new(PostgresProductRepository::new(pool.clone())),
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            audit: Arc::new(PostgresAuditRepository::new(pool)),
        }
    }
}

/// Fully wired services.
#[derive(Clone)]
pub struct Marketplace {
    pub audit: Arc<Audit>,
    pub auth: Arc<Auth>,
    pub catalog: Arc<Catalog>,
    users: Arc<dyn UserRepository>,
}

impl Marketplace {
    pub fn wire(repositories: Repositories) -> Result<Self, WiringError> {
        let Repositories {
            products,
            users,
            audit: trail,
        } = repositories;

        let audit = Arc::new(AuditServiceImpl::new(trail));
        let auth = Arc::new(SessionAuthService::new(users.clone(), audit.clone()));
        audit.bind_actor_source(&auth)?;
        let catalog = Arc::new(InstrumentedCatalog::new(CatalogServiceImpl::new(
            products,
            audit.clone(),
        )));

        tracing::debug!("services wired");
        Ok(Self {
            audit,
            auth,
            catalog,
            users,
        })
    }

    /// Create the administrator account unless the username is taken.
    /// Returns whether an account was created.
    pub fn seed_admin(&self, username: &str, password: &str) -> Result<bool, DomainError> {
        if self.users.find_by_username(username)?.is_some() {
            tracing::debug!(username, "admin account already present");
            return Ok(false);
        }
        let admin = User::new(username, password, Role::Admin);
        admin.validate()?;
        self.users.save(admin)?;
        tracing::info!(username, "admin account created");
        Ok(true)
    }
}
