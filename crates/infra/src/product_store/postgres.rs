//! Postgres-backed product store.
//!
//! Products live in a single `products` table. Each operation is one statement;
//! concurrent writers follow last-write-wins.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (check constraint violation) | `23514` | `Domain(Validation)` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / network / other | N/A | `Database` |

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::{Span, instrument};

use catalog_core::{DomainError, ProductId};
use catalog_products::{Category, NewProduct, Product, ProductFilter, ProductPatch};

use super::r#trait::{ProductStore, StoreError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id          UUID PRIMARY KEY,
    name        VARCHAR(100) NOT NULL,
    description VARCHAR(250) NOT NULL,
    price       NUMERIC(14, 2) NOT NULL CHECK (price >= 0),
    available   BOOLEAN NOT NULL DEFAULT TRUE,
    category    VARCHAR(20) NOT NULL DEFAULT 'UNKNOWN',
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Postgres-backed product store.
///
/// Uses an SQLx connection pool, so it is `Send + Sync` and cheap to share.
#[derive(Debug, Clone)]
pub struct PostgresProductStore {
    pool: Arc<PgPool>,
}

impl PostgresProductStore {
    /// Create a new PostgresProductStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Open a pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `products` table if it does not exist yet.
    #[instrument(skip(self), err)]
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("init_schema", e))?;
        Ok(())
    }
}

#[async_trait]
impl ProductStore for PostgresProductStore {
    #[instrument(skip(self, draft), fields(name = %draft.name()), err)]
    async fn create(&self, draft: NewProduct) -> Result<Product, StoreError> {
        let id = ProductId::new();

        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, available, category)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(id.as_uuid())
        .bind(draft.name())
        .bind(draft.description())
        .bind(draft.price().amount())
        .bind(draft.available())
        .bind(draft.category().as_str())
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create", e))?;

        Ok(Product::from_draft(id, draft))
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn find(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, description, price, available, category, created_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find", e))?;

        row.map(|r| ProductRow::from_row(&r)?.into_product())
            .transpose()
    }

    #[instrument(skip(self, patch), fields(product_id = %id), err)]
    async fn update(
        &self,
        id: ProductId,
        patch: ProductPatch,
    ) -> Result<Option<Product>, StoreError> {
        patch.validate()?;

        let row = sqlx::query(
            r#"
            UPDATE products SET
                name        = COALESCE($2, name),
                description = COALESCE($3, description),
                price       = COALESCE($4, price),
                available   = COALESCE($5, available),
                category    = COALESCE($6, category)
            WHERE id = $1
            RETURNING id, name, description, price, available, category, created_at
            "#,
        )
        .bind(id.as_uuid())
        .bind(patch.name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.price.map(|p| p.amount()))
        .bind(patch.available)
        .bind(patch.category.map(|c| c.as_str()))
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        row.map(|r| ProductRow::from_row(&r)?.into_product())
            .transpose()
    }

    #[instrument(skip(self), fields(product_id = %id), err)]
    async fn delete(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(product_count = tracing::field::Empty), err)]
    async fn query(&self, filter: &ProductFilter) -> Result<Vec<Product>, StoreError> {
        let span = Span::current();

        let rows = sqlx::query(
            r#"
            SELECT id, name, description, price, available, category, created_at
            FROM products
            WHERE ($1::text IS NULL OR name = $1)
                AND ($2::text IS NULL OR category = $2)
                AND ($3::boolean IS NULL OR available = $3)
                AND ($4::numeric IS NULL OR price = $4)
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(filter.name.as_deref())
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.available)
        .bind(filter.price.map(|p| p.amount()))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query", e))?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(ProductRow::from_row(&row)?.into_product()?);
        }

        span.record("product_count", products.len());
        Ok(products)
    }

    #[instrument(skip(self), err)]
    async fn clear(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM products")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("clear", e))?;
        Ok(())
    }
}

/// Raw `products` row, checked against domain rules by `into_product`.
struct ProductRow {
    id: uuid::Uuid,
    name: String,
    description: String,
    price: Decimal,
    available: bool,
    category: String,
    #[allow(dead_code)] // Ordering key only; not part of the product.
    created_at: DateTime<Utc>,
}

impl ProductRow {
    fn from_row(row: &PgRow) -> Result<Self, StoreError> {
        let get = |e: sqlx::Error| StoreError::Corrupt(format!("failed to read product row: {e}"));
        Ok(ProductRow {
            id: row.try_get("id").map_err(get)?,
            name: row.try_get("name").map_err(get)?,
            description: row.try_get("description").map_err(get)?,
            price: row.try_get("price").map_err(get)?,
            available: row.try_get("available").map_err(get)?,
            category: row.try_get("category").map_err(get)?,
            created_at: row.try_get("created_at").map_err(get)?,
        })
    }

    fn into_product(self) -> Result<Product, StoreError> {
        let id = ProductId::from_uuid(self.id);
        let corrupt = |e: DomainError| StoreError::Corrupt(format!("product {id}: {e}"));

        let category: Category = self.category.parse().map_err(corrupt)?;
        let draft = NewProduct::new(
            self.name,
            self.description,
            self.price,
            self.available,
            category,
        )
        .map_err(corrupt)?;
        Ok(Product::from_draft(id, draft))
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                // Check constraint violation (e.g. negative price).
                Some("23514") => StoreError::Domain(DomainError::validation(msg)),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {}", operation))
        }
        _ => StoreError::Database(format!("sqlx error in {}: {}", operation, err)),
    }
}
