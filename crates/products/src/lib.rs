//! Products domain module.
//!
//! This crate contains business rules for the product catalog, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod filter;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod product;

pub use category::Category;
pub use filter::ProductFilter;
pub use product::{NewProduct, Price, Product, ProductPatch};

pub use catalog_core::ProductId;
