use core::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use catalog_core::{DomainError, DomainResult};
use catalog_products::{Category, Price, ProductFilter};

// -------------------------
// Query DTOs
// -------------------------

/// Query string of `GET /products`. Empty values count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub name: Option<String>,
    pub category: Option<String>,
    pub available: Option<String>,
    pub price: Option<String>,
}

impl ListProductsQuery {
    pub fn into_filter(self) -> DomainResult<ProductFilter> {
        let category = non_empty(self.category)
            .map(|c| c.parse::<Category>())
            .transpose()?;
        let price = non_empty(self.price).map(|p| parse_price(&p)).transpose()?;

        Ok(ProductFilter {
            name: non_empty(self.name),
            category,
            available: non_empty(self.available).map(|a| parse_availability(&a)),
            price,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// `true`, `yes` and `1` (any case) mean available; everything else does not.
pub fn parse_availability(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

fn parse_price(raw: &str) -> DomainResult<Price> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|e| DomainError::validation(format!("invalid price '{raw}': {e}")))?;
    Price::new(amount)
}
