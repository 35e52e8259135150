//! Search criteria and the predicates they reduce to.
//!
//! Criteria double as search cache keys, so two criteria built from the same
//! inputs must compare and hash equal regardless of construction order.

use marketplace_core::{Price, ValueObject};
use serde::Serialize;

use crate::Product;

/// Immutable conjunction of optional product filters.
///
/// Text filters are trimmed and blank input means "no filter". Case is kept
/// as given; matching is case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SearchCriteria {
    category: Option<String>,
    brand: Option<String>,
    min_price: Option<Price>,
    max_price: Option<Price>,
}

impl ValueObject for SearchCriteria {}

/// A single filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
    CategoryIs(&'a str),
    BrandIs(&'a str),
    PriceAtLeast(Price),
    PriceAtMost(Price),
}

impl Predicate<'_> {
    pub fn matches(&self, product: &Product) -> bool {
        match *self {
            Predicate::CategoryIs(category) => eq_ignore_case(&product.category, category),
            Predicate::BrandIs(brand) => eq_ignore_case(&product.brand, brand),
            Predicate::PriceAtLeast(min) => product.price >= min,
            Predicate::PriceAtMost(max) => product.price <= max,
        }
    }
}

fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

fn normalize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

impl SearchCriteria {
    /// Matches every product.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_category<'a>(mut self, category: impl Into<Option<&'a str>>) -> Self {
        self.category = normalize(category.into());
        self
    }

    pub fn with_brand<'a>(mut self, brand: impl Into<Option<&'a str>>) -> Self {
        self.brand = normalize(brand.into());
        self
    }

    pub fn with_min_price(mut self, min: impl Into<Option<Price>>) -> Self {
        self.min_price = min.into();
        self
    }

    pub fn with_max_price(mut self, max: impl Into<Option<Price>>) -> Self {
        self.max_price = max.into();
        self
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn min_price(&self) -> Option<Price> {
        self.min_price
    }

    pub fn max_price(&self) -> Option<Price> {
        self.max_price
    }

    /// True when no filter is set.
    pub fn is_unrestricted(&self) -> bool {
        self.predicates().is_empty()
    }

    /// The set filters, in a fixed order. Stores translate these into their
    /// own query language.
    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let mut out = Vec::with_capacity(4);
        if let Some(category) = self.category.as_deref() {
            out.push(Predicate::CategoryIs(category));
        }
        if let Some(brand) = self.brand.as_deref() {
            out.push(Predicate::BrandIs(brand));
        }
        if let Some(min) = self.min_price {
            out.push(Predicate::PriceAtLeast(min));
        }
        if let Some(max) = self.max_price {
            out.push(Predicate::PriceAtMost(max));
        }
        out
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.predicates().iter().all(|p| p.matches(product))
    }
}

impl core::fmt::Display for SearchCriteria {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        fn or_any<T: ToString>(v: Option<T>) -> String {
            v.map_or_else(|| "*".to_string(), |v| v.to_string())
        }
        write!(
            f,
            "category={} brand={} minPrice={} maxPrice={}",
            or_any(self.category()),
            or_any(self.brand()),
            or_any(self.min_price),
            or_any(self.max_price),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(category: &str, brand: &str, minor: u64) -> Product {
        Product::new("x", category, brand, Price::from_minor(minor), 1)
    }

    #[test]
    fn blank_text_means_no_filter() {
        let c = SearchCriteria::any().with_category("   ").with_brand("");
        assert_eq!(c, SearchCriteria::any());
        assert!(c.is_unrestricted());
    }

    #[test]
    fn text_is_trimmed_but_case_is_kept() {
        let c = SearchCriteria::any().with_category("  Books ");
        assert_eq!(c.category(), Some("Books"));
        assert_ne!(c, SearchCriteria::any().with_category("books"));
    }

    #[test]
    fn text_matching_ignores_case() {
        let c = SearchCriteria::any().with_category("BOOKS").with_brand("acme");
        assert!(c.matches(&product("books", "Acme", 100)));
        assert!(!c.matches(&product("books", "Other", 100)));

        let c = SearchCriteria::any().with_category("электроника");
        assert!(c.matches(&product("Электроника", "x", 1)));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let c = SearchCriteria::any()
            .with_min_price(Price::from_minor(100))
            .with_max_price(Price::from_minor(200));
        assert!(c.matches(&product("a", "b", 100)));
        assert!(c.matches(&product("a", "b", 200)));
        assert!(!c.matches(&product("a", "b", 99)));
        assert!(!c.matches(&product("a", "b", 201)));
    }

    #[test]
    fn inverted_bounds_match_nothing() {
        let c = SearchCriteria::any()
            .with_min_price(Price::from_minor(500))
            .with_max_price(Price::from_minor(100));
        assert!(!c.matches(&product("a", "b", 300)));
        assert_eq!(c.predicates().len(), 2);
    }

    #[test]
    fn display_marks_unset_filters() {
        let c = SearchCriteria::any()
            .with_category("Books")
            .with_max_price(Price::from_minor(1999));
        assert_eq!(
            c.to_string(),
            "category=Books brand=* minPrice=* maxPrice=19.99"
        );
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        fn hash_of(c: &SearchCriteria) -> u64 {
            let mut h = DefaultHasher::new();
            c.hash(&mut h);
            h.finish()
        }

        proptest! {
            #[test]
            fn construction_order_does_not_affect_identity(
                category in proptest::option::of("[ a-zA-Z]{0,8}"),
                brand in proptest::option::of("[ a-zA-Z]{0,8}"),
                min in proptest::option::of(0u64..10_000),
                max in proptest::option::of(0u64..10_000),
            ) {
                let forward = SearchCriteria::any()
                    .with_category(category.as_deref())
                    .with_brand(brand.as_deref())
                    .with_min_price(min.map(Price::from_minor))
                    .with_max_price(max.map(Price::from_minor));
                let backward = SearchCriteria::any()
                    .with_max_price(max.map(Price::from_minor))
                    .with_min_price(min.map(Price::from_minor))
                    .with_brand(brand.as_deref())
                    .with_category(category.as_deref());

                prop_assert_eq!(&forward, &backward);
                prop_assert_eq!(hash_of(&forward), hash_of(&backward));
            }
        }
    }
}
