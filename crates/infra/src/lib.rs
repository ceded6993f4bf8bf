//! Infrastructure layer: product persistence and configuration.

pub mod config;
pub mod product_store;

pub use config::{AppConfig, ConfigError};
pub use product_store::{InMemoryProductStore, PostgresProductStore, ProductStore, StoreError};
