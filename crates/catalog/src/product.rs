//! Catalog products.

use std::cmp::Ordering;

use marketplace_core::{DomainError, Entity, FieldViolation, Price, ProductId};
use serde::{Deserialize, Serialize};

/// A catalog product.
///
/// # Invariants
/// - `id` is assigned by the store on first save and never changes.
/// - `price` and `stock` are non-negative by construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub id: Option<ProductId>,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: Price,
    pub stock: u32,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        brand: impl Into<String>,
        price: Price,
        stock: u32,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            category: category.into(),
            brand: brand.into(),
            price,
            stock,
        }
    }

    pub fn with_id(mut self, id: ProductId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        let mut violations = Vec::new();
        if self.name.trim().is_empty() {
            violations.push(FieldViolation::new("name", "must not be blank"));
        }
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::Validation(violations))
        }
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> Option<ProductId> {
        self.id
    }
}

/// Listing order shared by every store: name, then id.
pub fn catalog_order(a: &Product, b: &Product) -> Ordering {
    a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> ProductId {
        ProductId::new(n).unwrap()
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Product::new(" \t", "Books", "Acme", Price::ZERO, 0)
            .validate()
            .unwrap_err();
        assert_eq!(err.violations()[0].field, "name");
    }

    #[test]
    fn zero_price_and_stock_are_valid() {
        let p = Product::new("Pen", "Office", "Bic", Price::ZERO, 0);
        assert!(p.validate().is_ok());
        assert!(!p.is_persisted());
        assert!(p.with_id(id(3)).is_persisted());
    }

    #[test]
    fn order_is_name_then_id() {
        let mut items = vec![
            Product::new("b", "", "", Price::ZERO, 0).with_id(id(1)),
            Product::new("a", "", "", Price::ZERO, 0).with_id(id(9)),
            Product::new("a", "", "", Price::ZERO, 0).with_id(id(2)),
        ];
        items.sort_by(catalog_order);
        let ids: Vec<u64> = items.iter().map(|p| p.id.unwrap().get()).collect();
        assert_eq!(ids, [2, 9, 1]);
    }

    #[test]
    fn serializes_price_as_decimal() {
        let p = Product::new("Book", "Books", "Acme", Price::from_minor(1250), 4).with_id(id(7));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["price"], 12.5);
        assert_eq!(json["stock"], 4);
    }
}
