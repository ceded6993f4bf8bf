//! Catalog search criteria.

use crate::category::Category;
use crate::product::{Price, Product};

/// Conjunction of optional search criteria. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    /// Exact name match.
    pub name: Option<String>,
    pub category: Option<Category>,
    pub available: Option<bool>,
    /// Exact price match.
    pub price: Option<Price>,
}

impl ProductFilter {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn by_category(category: Category) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn by_availability(available: bool) -> Self {
        Self {
            available: Some(available),
            ..Self::default()
        }
    }

    pub fn by_price(price: Price) -> Self {
        Self {
            price: Some(price),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn matches(&self, product: &Product) -> bool {
        self.name.as_deref().is_none_or(|n| product.name() == n)
            && self.category.is_none_or(|c| product.category() == c)
            && self.available.is_none_or(|a| product.available() == a)
            && self.price.is_none_or(|p| product.price() == p)
    }
}
