use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::debug;

use catalog_core::{Entity, ProductId};
use catalog_products::{NewProduct, Product, ProductFilter, ProductPatch};

use super::r#trait::{ProductStore, StoreError};

/// In-memory product store.
///
/// Intended for tests/dev. Keyed by time-ordered ids, so iteration order is
/// creation order.
#[derive(Debug, Default)]
pub struct InMemoryProductStore {
    products: RwLock<BTreeMap<ProductId, Product>>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned<T>(_: T) -> StoreError {
        StoreError::Database("lock poisoned".to_string())
    }
}

#[async_trait]
impl ProductStore for InMemoryProductStore {
    async fn create(&self, draft: NewProduct) -> Result<Product, StoreError> {
        let mut products = self.products.write().map_err(Self::poisoned)?;

        let mut id = ProductId::new();
        while products.contains_key(&id) {
            id = ProductId::new();
        }

        let product = Product::from_draft(id, draft);
        products.insert(product.key(), product.clone());
        debug!(product_id = %id, "stored product in memory");
        Ok(product)
    }

    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let products = self.products.read().map_err(Self::poisoned)?;
        Ok(products.get(&id).cloned())
    }

    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        patch.validate()?;

        let mut products = self.products.write().map_err(Self::poisoned)?;
        let Some(product) = products.get_mut(&id) else {
            return Ok(None);
        };
        product.apply(&patch)?;
        Ok(Some(product.clone()))
    }

    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut products = self.products.write().map_err(Self::poisoned)?;
        Ok(products.remove(&id).is_some())
    }

    async fn query(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().map_err(Self::poisoned)?;
        Ok(products
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.products.write().map_err(Self::poisoned)?.clear();
        Ok(())
    }
}
