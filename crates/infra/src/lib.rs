//! Infrastructure layer: configuration, PostgreSQL stores and service wiring.

pub mod bootstrap;
pub mod config;
pub mod postgres;

pub use bootstrap::{Marketplace, Repositories};
pub use config::{AppConfig, ConfigError};

#[cfg(test)]
mod integration_tests;
