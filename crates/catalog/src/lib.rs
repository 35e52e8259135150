//! `marketplace-catalog`: products, search criteria, the memoizing search
//! cache and the catalog service that ties them to the audit trail.

pub mod cache;
pub mod criteria;
pub mod instrumented;
pub mod product;
pub mod repository;
pub mod service;

pub use cache::SearchCache;
pub use criteria::{Predicate, SearchCriteria};
pub use instrumented::InstrumentedCatalog;
pub use product::{Product, catalog_order};
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::{CatalogService, CatalogServiceImpl};
