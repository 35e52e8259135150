//! Catalog store boundary.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use marketplace_core::{ProductId, RepositoryError};

use crate::{Product, SearchCriteria, catalog_order};

/// Durable product collection.
///
/// Listing and search results are ordered by name, then id.
pub trait ProductRepository: Send + Sync {
    /// Insert when `id` is absent (assigning a fresh one), otherwise overwrite.
    fn save(&self, product: Product) -> Result<Product, RepositoryError>;

    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    fn find_all(&self) -> Result<Vec<Product>, RepositoryError>;

    /// Returns whether a product was removed.
    fn delete_by_id(&self, id: ProductId) -> Result<bool, RepositoryError>;

    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Product>, RepositoryError>;
}

impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    fn save(&self, product: Product) -> Result<Product, RepositoryError> {
        (**self).save(product)
    }

    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        (**self).find_by_id(id)
    }

    fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        (**self).find_all()
    }

    fn delete_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        (**self).delete_by_id(id)
    }

    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Product>, RepositoryError> {
        (**self).search(criteria)
    }
}

/// In-memory product store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryProductRepository {
    products: RwLock<HashMap<ProductId, Product>>,
    last_id: AtomicU64,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn collect<F>(&self, operation: &'static str, keep: F) -> Result<Vec<Product>, RepositoryError>
    where
        F: Fn(&Product) -> bool,
    {
        let products = self
            .products
            .read()
            .map_err(|_| RepositoryError::lock_poisoned(operation))?;
        let mut out: Vec<Product> = products.values().filter(|p| keep(p)).cloned().collect();
        out.sort_by(catalog_order);
        Ok(out)
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn save(&self, mut product: Product) -> Result<Product, RepositoryError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| RepositoryError::lock_poisoned("products.save"))?;

        let id = match product.id {
            Some(id) => {
                // Keep the counter ahead of explicitly chosen ids.
                self.last_id.fetch_max(id.get(), Ordering::SeqCst);
                id
            }
            None => {
                let next = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
                ProductId::new(next)
                    .ok_or_else(|| RepositoryError::msg("products.save", "id space exhausted"))?
            }
        };
        product.id = Some(id);
        products.insert(id, product.clone());
        Ok(product)
    }

    fn find_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self
            .products
            .read()
            .map_err(|_| RepositoryError::lock_poisoned("products.find_by_id"))?;
        Ok(products.get(&id).cloned())
    }

    fn find_all(&self) -> Result<Vec<Product>, RepositoryError> {
        self.collect("products.find_all", |_| true)
    }

    fn delete_by_id(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let mut products = self
            .products
            .write()
            .map_err(|_| RepositoryError::lock_poisoned("products.delete_by_id"))?;
        Ok(products.remove(&id).is_some())
    }

    fn search(&self, criteria: &SearchCriteria) -> Result<Vec<Product>, RepositoryError> {
        self.collect("products.search", |p| criteria.matches(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marketplace_core::Price;

    fn seeded() -> InMemoryProductRepository {
        let repo = InMemoryProductRepository::new();
        repo.save(Product::new("Pen", "Office", "Bic", Price::from_minor(150), 100))
            .unwrap();
        repo.save(Product::new("Book", "Books", "Acme", Price::from_minor(1250), 5))
            .unwrap();
        repo.save(Product::new("Atlas", "Books", "Other", Price::from_minor(3000), 1))
            .unwrap();
        repo
    }

    #[test]
    fn save_assigns_sequential_ids() {
        let repo = seeded();
        let ids: Vec<u64> = repo
            .find_all()
            .unwrap()
            .iter()
            .map(|p| p.id.unwrap().get())
            .collect();
        // Sorted by name: Atlas, Book, Pen.
        assert_eq!(ids, [3, 2, 1]);
    }

    #[test]
    fn save_with_id_overwrites() {
        let repo = seeded();
        let mut pen = repo.find_by_id(ProductId::new(1).unwrap()).unwrap().unwrap();
        pen.stock = 0;
        repo.save(pen.clone()).unwrap();

        assert_eq!(repo.find_all().unwrap().len(), 3);
        assert_eq!(repo.find_by_id(pen.id.unwrap()).unwrap().unwrap().stock, 0);
    }

    #[test]
    fn explicit_ids_are_never_reissued() {
        let repo = InMemoryProductRepository::new();
        let id = ProductId::new(10).unwrap();
        repo.save(Product::new("a", "", "", Price::ZERO, 0).with_id(id))
            .unwrap();
        let next = repo.save(Product::new("b", "", "", Price::ZERO, 0)).unwrap();
        assert_eq!(next.id.unwrap().get(), 11);
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let repo = seeded();
        let id = ProductId::new(2).unwrap();
        assert!(repo.delete_by_id(id).unwrap());
        assert!(!repo.delete_by_id(id).unwrap());
        assert!(repo.find_by_id(id).unwrap().is_none());
    }

    #[test]
    fn search_filters_and_orders() {
        let repo = seeded();
        let books = repo
            .search(&SearchCriteria::any().with_category("books"))
            .unwrap();
        let names: Vec<&str> = books.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Atlas", "Book"]);

        let cheap = repo
            .search(&SearchCriteria::any().with_max_price(Price::from_minor(1250)))
            .unwrap();
        let names: Vec<&str> = cheap.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Book", "Pen"]);

        assert!(
            repo.search(&SearchCriteria::any().with_brand("nobody"))
                .unwrap()
                .is_empty()
        );
    }
}
