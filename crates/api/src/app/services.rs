use std::sync::Arc;

use tracing::info;

use catalog_infra::{
    AppConfig, InMemoryProductStore, PostgresProductStore, ProductStore, StoreError,
};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn ProductStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        Self { store }
    }

    /// Services backed by a fresh in-memory store (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryProductStore::new()))
    }

    pub fn store(&self) -> &dyn ProductStore {
        self.store.as_ref()
    }
}

/// Pick the store from configuration: Postgres when `DATABASE_URL` is set,
/// in-memory otherwise.
pub async fn build_services(config: &AppConfig) -> Result<AppServices, StoreError> {
    match config.database_url.as_deref() {
        Some(url) => {
            let store = PostgresProductStore::connect(url, config.db_max_connections).await?;
            store.init_schema().await?;
            info!(
                max_connections = config.db_max_connections,
                "using postgres product store"
            );
            Ok(AppServices::new(Arc::new(store)))
        }
        None => {
            info!("DATABASE_URL not set; using in-memory product store");
            Ok(AppServices::in_memory())
        }
    }
}
