use async_trait::async_trait;
use thiserror::Error;

use catalog_core::{DomainError, ProductId};
use catalog_products::{Category, NewProduct, Price, Product, ProductFilter, ProductPatch};

/// Product store errors.
///
/// - **Domain**: the request itself was invalid (validation, bad id)
/// - **Database**: the backend failed; callers surface this as a server fault
/// - **Corrupt**: a stored row no longer satisfies domain rules
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(String),

    #[error("corrupt product record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Domain(e) if e.is_validation())
    }
}

/// Repository of catalog products.
///
/// Reads of an unknown id yield `Ok(None)`, never an error. Searches return a
/// possibly-empty collection. `delete` is idempotent.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Store a draft under a freshly assigned id.
    async fn create(&self, draft: NewProduct) -> Result<Product, StoreError>;

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Apply a partial update. `Ok(None)` when no product has this id.
    async fn update(&self, id: ProductId, patch: ProductPatch)
    -> Result<Option<Product>, StoreError>;

    /// Remove a product; returns whether anything was removed.
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Products matching every criterion in `filter`, in creation order.
    async fn query(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Remove every product.
    async fn clear(&self) -> Result<(), StoreError>;

    async fn all(&self) -> Result<Vec<Product>, StoreError> {
        self.query(&ProductFilter::default()).await
    }

    async fn find_by_name(&self, name: &str) -> Result<Vec<Product>, StoreError> {
        self.query(&ProductFilter::by_name(name)).await
    }

    async fn find_by_category(&self, category: Category) -> Result<Vec<Product>, StoreError> {
        self.query(&ProductFilter::by_category(category)).await
    }

    async fn find_by_availability(&self, available: bool) -> Result<Vec<Product>, StoreError> {
        self.query(&ProductFilter::by_availability(available)).await
    }

    async fn find_by_price(&self, price: Price) -> Result<Vec<Product>, StoreError> {
        self.query(&ProductFilter::by_price(price)).await
    }
}
