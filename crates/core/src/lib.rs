//! `marketplace-core`: ids, money, errors and entity traits shared by the marketplace crates.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use entity::Entity;
pub use error::{BoxError, DomainError, DomainResult, FieldViolation, RepositoryError};
pub use id::{ProductId, UserId};
pub use money::Price;
pub use value_object::ValueObject;
