use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use catalog_core::{DomainError, DomainResult, Entity, ProductId, ValueObject};

use crate::category::Category;

/// Largest storable price (`numeric(14,2)` holds twelve integer digits).
const MAX_PRICE_UNITS: i64 = 1_000_000_000_000;

/// Number of decimal places a price carries.
const PRICE_SCALE: u32 = 2;

/// Non-negative monetary amount with two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl ValueObject for Price {}

impl Price {
    /// Validate and normalize an amount (`12.5` becomes `12.50`).
    pub fn new(amount: Decimal) -> DomainResult<Self> {
        if amount < Decimal::ZERO {
            return Err(DomainError::validation("price must not be negative"));
        }
        if amount.normalize().scale() > PRICE_SCALE {
            return Err(DomainError::validation(
                "price must have at most two decimal places",
            ));
        }
        if amount >= Decimal::from(MAX_PRICE_UNITS) {
            return Err(DomainError::validation("price is too large"));
        }

        let mut normalized = if amount.is_zero() { Decimal::ZERO } else { amount.normalize() };
        normalized.rescale(PRICE_SCALE);
        Ok(Self(normalized))
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Price {
    type Error = DomainError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Column widths of the `products` table.
pub const MAX_NAME_LEN: usize = 100;
pub const MAX_DESCRIPTION_LEN: usize = 250;

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DomainError::validation(format!(
            "name must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> DomainResult<()> {
    if description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(DomainError::validation(format!(
            "description must be at most {MAX_DESCRIPTION_LEN} characters"
        )));
    }
    Ok(())
}

/// Maps a serde failure on request input to a validation error.
fn invalid_payload(err: serde_json::Error) -> DomainError {
    DomainError::validation(format!("invalid product payload: {err}"))
}

/// A product that has not been stored yet (no id assigned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    name: String,
    description: String,
    price: Price,
    available: bool,
    category: Category,
}

/// Wire shape of a product draft; every field is required. A client-supplied
/// `id` is tolerated and ignored.
#[derive(Debug, Deserialize)]
struct DraftPayload {
    name: String,
    description: String,
    price: Decimal,
    available: bool,
    category: Category,
}

impl NewProduct {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Decimal,
        available: bool,
        category: Category,
    ) -> DomainResult<Self> {
        let name = name.into();
        let description = description.into();
        validate_name(&name)?;
        validate_description(&description)?;
        Ok(Self {
            name,
            description,
            price: Price::new(price)?,
            available,
            category,
        })
    }

    /// Build a draft from untrusted JSON.
    ///
    /// Missing fields, wrong JSON types and unknown categories all surface as
    /// [`DomainError::Validation`].
    pub fn from_json(value: JsonValue) -> DomainResult<Self> {
        let payload: DraftPayload = serde_json::from_value(value).map_err(invalid_payload)?;
        Self::new(
            payload.name,
            payload.description,
            payload.price,
            payload.available,
            payload.category,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn category(&self) -> Category {
        self.category
    }
}

impl core::fmt::Display for NewProduct {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "<Product {} id=[None]>", self.name)
    }
}

/// A stored catalog product.
///
/// Only built from a validated [`NewProduct`]; JSON input goes through
/// [`NewProduct::from_json`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    id: ProductId,
    name: String,
    description: String,
    price: Price,
    available: bool,
    category: Category,
}

impl Product {
    /// Attach a store-assigned id to a validated draft.
    pub fn from_draft(id: ProductId, draft: NewProduct) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            available: draft.available,
            category: draft.category,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn available(&self) -> bool {
        self.available
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// The draft this product would be re-created from (everything but the id).
    pub fn to_draft(&self) -> NewProduct {
        NewProduct {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            available: self.available,
            category: self.category,
        }
    }

    /// Apply a partial update in place.
    ///
    /// The patch is validated before anything is written, so a rejected patch
    /// leaves the product untouched.
    pub fn apply(&mut self, patch: &ProductPatch) -> DomainResult<()> {
        patch.validate()?;

        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(available) = patch.available {
            self.available = available;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        Ok(())
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Product {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "<Product {} id=[{}]>", self.name, self.id)
    }
}

/// Partial update: present fields replace stored values, absent fields are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub available: Option<bool>,
    pub category: Option<Category>,
}

impl ProductPatch {
    /// Build a patch from untrusted JSON. `null` counts as absent; an `id` is ignored.
    pub fn from_json(value: JsonValue) -> DomainResult<Self> {
        if !value.is_object() {
            return Err(DomainError::validation(
                "invalid product payload: expected a JSON object",
            ));
        }
        let patch: ProductPatch = serde_json::from_value(value).map_err(invalid_payload)?;
        patch.validate()?;
        Ok(patch)
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn price(mut self, price: Decimal) -> DomainResult<Self> {
        self.price = Some(Price::new(price)?);
        Ok(self)
    }

    pub fn available(mut self, available: bool) -> Self {
        self.available = Some(available);
        self
    }

    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn is_empty(&self) -> bool {
        self == &ProductPatch::default()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if let Some(description) = &self.description {
            validate_description(description)?;
        }
        Ok(())
    }
}
