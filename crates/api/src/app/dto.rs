use serde::{Deserialize, Serialize};

use marketplace_auth::{Role, User};
use marketplace_catalog::{Product, SearchCriteria};
use marketplace_core::{DomainError, FieldViolation, Price, UserId};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Option<UserId>,
    pub username: String,
    pub role: Role,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

/// Body of product create/replace requests.
///
/// Every field is optional on the wire so that missing values surface as
/// field violations instead of a generic body rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

impl ProductRequest {
    pub fn into_product(self) -> Result<Product, DomainError> {
        let mut violations = Vec::new();

        let name = self.name.unwrap_or_default();
        if name.trim().is_empty() {
            violations.push(FieldViolation::new("name", "must not be blank"));
        }

        let price = match self.price {
            None => {
                violations.push(FieldViolation::new("price", "is required"));
                None
            }
            Some(raw) => match Price::from_decimal(raw) {
                Ok(price) => Some(price),
                Err(err) => {
                    violations.extend(err.violations().iter().cloned());
                    None
                }
            },
        };

        let stock = match self.stock {
            None => Some(0),
            Some(raw) if raw < 0 => {
                violations.push(FieldViolation::new("stock", "must not be negative"));
                None
            }
            Some(raw) => match u32::try_from(raw) {
                Ok(stock) => Some(stock),
                Err(_) => {
                    violations.push(FieldViolation::new("stock", "is too large"));
                    None
                }
            },
        };

        match (price, stock) {
            (Some(price), Some(stock)) if violations.is_empty() => Ok(Product::new(
                name.trim(),
                self.category.unwrap_or_default().trim(),
                self.brand.unwrap_or_default().trim(),
                price,
                stock,
            )),
            _ => Err(DomainError::Validation(violations)),
        }
    }
}

/// `GET /products` query string. Kept as raw text so malformed numbers can be
/// reported per field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl ProductQuery {
    pub fn criteria(&self) -> Result<SearchCriteria, DomainError> {
        let mut violations = Vec::new();
        let min = parse_bound("minPrice", self.min_price.as_deref(), &mut violations);
        let max = parse_bound("maxPrice", self.max_price.as_deref(), &mut violations);
        if !violations.is_empty() {
            return Err(DomainError::Validation(violations));
        }

        Ok(SearchCriteria::any()
            .with_category(self.category.as_deref())
            .with_brand(self.brand.as_deref())
            .with_min_price(min)
            .with_max_price(max))
    }
}

fn parse_bound(
    field: &'static str,
    raw: Option<&str>,
    violations: &mut Vec<FieldViolation>,
) -> Option<Price> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    match raw.parse::<Price>() {
        Ok(price) => Some(price),
        Err(_) => {
            violations.push(FieldViolation::new(
                field,
                format!("must be a non-negative number, got {raw:?}"),
            ));
            None
        }
    }
}
