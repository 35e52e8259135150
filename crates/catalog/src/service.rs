//! Catalog service: CRUD over the store, cached search, audit on every write.

use std::sync::Arc;

use marketplace_audit::AuditService;
use marketplace_core::{DomainError, DomainResult, ProductId, RepositoryError};

use crate::{Product, ProductRepository, SearchCache, SearchCriteria};

pub const ADD_PRODUCT: &str = "ADD_PRODUCT";
pub const UPDATE_PRODUCT: &str = "UPDATE_PRODUCT";
pub const DELETE_PRODUCT: &str = "DELETE_PRODUCT";
pub const CACHE_MISS: &str = "CACHE_MISS";
pub const CACHE_INVALIDATED: &str = "CACHE_INVALIDATED";

/// Product catalog operations.
///
/// No role checks happen here; gating belongs to the layer above.
pub trait CatalogService: Send + Sync {
    /// Persist a new product. The product must not carry an id yet.
    fn add(&self, product: Product) -> DomainResult<Product>;

    /// Overwrite an existing product, identified by its id.
    fn update(&self, product: Product) -> DomainResult<Product>;

    fn remove(&self, id: ProductId) -> DomainResult<()>;

    fn get_by_id(&self, id: ProductId) -> DomainResult<Option<Product>>;

    fn get_all(&self) -> DomainResult<Vec<Product>>;

    /// Products matching `criteria`, served from cache when possible.
    fn search(&self, criteria: &SearchCriteria) -> DomainResult<Vec<Product>>;
}

impl<S> CatalogService for Arc<S>
where
    S: CatalogService + ?Sized,
{
    fn add(&self, product: Product) -> DomainResult<Product> {
        (**self).add(product)
    }

    fn update(&self, product: Product) -> DomainResult<Product> {
        (**self).update(product)
    }

    fn remove(&self, id: ProductId) -> DomainResult<()> {
        (**self).remove(id)
    }

    fn get_by_id(&self, id: ProductId) -> DomainResult<Option<Product>> {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> DomainResult<Vec<Product>> {
        (**self).get_all()
    }

    fn search(&self, criteria: &SearchCriteria) -> DomainResult<Vec<Product>> {
        (**self).search(criteria)
    }
}

/// Catalog backed by a product store, a search cache and the audit trail.
///
/// Every successful mutation clears the whole search cache before the call
/// returns, then records one audit entry. `CACHE_INVALIDATED` is recorded
/// only when something was actually cleared.
///
/// A failed mutation touches neither cache nor audit trail. If the store
/// write succeeds but the audit append fails, the change stays applied and
/// the error is returned.
pub struct CatalogServiceImpl<R, A> {
    store: R,
    audit: A,
    cache: SearchCache,
}

impl<R, A> CatalogServiceImpl<R, A>
where
    R: ProductRepository,
    A: AuditService,
{
    pub fn new(store: R, audit: A) -> Self {
        Self {
            store,
            audit,
            cache: SearchCache::new(),
        }
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    fn invalidate_cache(&self) -> Result<(), RepositoryError> {
        let cleared = self.cache.invalidate_all();
        if cleared > 0 {
            tracing::debug!(cleared, "search cache invalidated");
            self.audit.log_action(CACHE_INVALIDATED)?;
        }
        Ok(())
    }
}

impl<R, A> CatalogService for CatalogServiceImpl<R, A>
where
    R: ProductRepository,
    A: AuditService,
{
    fn add(&self, product: Product) -> DomainResult<Product> {
        product.validate()?;
        if product.id.is_some() {
            return Err(DomainError::validation(
                "id",
                "must be absent for a new product",
            ));
        }

        let saved = self.store.save(product)?;
        self.invalidate_cache()?;
        let id = saved.id.map(u64::from).unwrap_or_default();
        self.audit
            .log_action(&format!("{ADD_PRODUCT}: id={id} name={}", saved.name))?;
        Ok(saved)
    }

    fn update(&self, product: Product) -> DomainResult<Product> {
        product.validate()?;
        let Some(id) = product.id else {
            return Err(DomainError::validation("id", "is required for an update"));
        };

        let saved = self.store.save(product)?;
        self.invalidate_cache()?;
        self.audit
            .log_action(&format!("{UPDATE_PRODUCT}: id={id}"))?;
        Ok(saved)
    }

    fn remove(&self, id: ProductId) -> DomainResult<()> {
        let removed = self.store.delete_by_id(id)?;
        if !removed {
            tracing::debug!(%id, "delete of absent product");
        }
        self.invalidate_cache()?;
        self.audit
            .log_action(&format!("{DELETE_PRODUCT}: id={id}"))?;
        Ok(())
    }

    fn get_by_id(&self, id: ProductId) -> DomainResult<Option<Product>> {
        Ok(self.store.find_by_id(id)?)
    }

    fn get_all(&self) -> DomainResult<Vec<Product>> {
        Ok(self.store.find_all()?)
    }

    fn search(&self, criteria: &SearchCriteria) -> DomainResult<Vec<Product>> {
        let found = self.cache.get_or_compute(criteria, || -> Result<_, RepositoryError> {
            tracing::debug!(%criteria, "search cache miss");
            self.audit
                .log_action(&format!("{CACHE_MISS}: criteria={criteria}"))?;
            self.store.search(criteria)
        })?;
        Ok(found)
    }
}
