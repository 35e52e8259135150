//! Timing and tracing decorator for any [`CatalogService`].

use std::time::Instant;

use marketplace_core::{DomainResult, ProductId};
use tracing::field::Empty;

use crate::{CatalogService, Product, SearchCriteria};

/// Wraps each catalog call in a `catalog` span and records its duration.
///
/// Results and errors pass through untouched.
pub struct InstrumentedCatalog<S> {
    inner: S,
}

impl<S: CatalogService> InstrumentedCatalog<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn timed<T>(&self, operation: &'static str, call: impl FnOnce(&S) -> DomainResult<T>) -> DomainResult<T> {
        let span = tracing::info_span!("catalog", operation, elapsed_ms = Empty, outcome = Empty);
        let _entered = span.enter();

        let started = Instant::now();
        let result = call(&self.inner);
        let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;

        span.record("elapsed_ms", elapsed_ms);
        match &result {
            Ok(_) => {
                span.record("outcome", "ok");
                tracing::debug!(elapsed_ms, "catalog call completed");
            }
            Err(err) => {
                span.record("outcome", "error");
                tracing::warn!(elapsed_ms, error = %err, "catalog call failed");
            }
        }
        result
    }
}

impl<S: CatalogService> CatalogService for InstrumentedCatalog<S> {
    fn add(&self, product: Product) -> DomainResult<Product> {
        self.timed("add", |inner| inner.add(product))
    }

    fn update(&self, product: Product) -> DomainResult<Product> {
        self.timed("update", |inner| inner.update(product))
    }

    fn remove(&self, id: ProductId) -> DomainResult<()> {
        self.timed("remove", |inner| inner.remove(id))
    }

    fn get_by_id(&self, id: ProductId) -> DomainResult<Option<Product>> {
        self.timed("get_by_id", |inner| inner.get_by_id(id))
    }

    fn get_all(&self) -> DomainResult<Vec<Product>> {
        self.timed("get_all", |inner| inner.get_all())
    }

    fn search(&self, criteria: &SearchCriteria) -> DomainResult<Vec<Product>> {
        self.timed("search", |inner| inner.search(criteria))
    }
}
