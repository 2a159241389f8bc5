//! Product model and the catalog port.
//!
//! The catalog owns durable product metadata and the canonical stock count.
//! The inventory ledger holds a derived, faster-to-read copy of that count;
//! reconciliation pushes the canonical value back into the ledger when the
//! two drift.

use crate::errors::CatalogResult;
use crate::types::ProductId;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a [`Money`] value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// Monetary amounts cannot be negative.
    #[error("Money amount cannot be negative: {0}")]
    Negative(Decimal),

    /// Monetary amounts carry at most two decimal places.
    #[error("Money amount cannot have more than 2 decimal places: {0}")]
    TooPrecise(Decimal),
}

/// A non-negative monetary amount with at most two decimal places.
///
/// Uses `Decimal` for precise financial arithmetic; never a float.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Creates a `Money` value, validating sign and scale.
    pub fn new(amount: Decimal) -> Result<Self, MoneyError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MoneyError::Negative(amount));
        }
        if amount.scale() > 2 {
            return Err(MoneyError::TooPrecise(amount));
        }
        Ok(Self(amount))
    }

    /// Creates a `Money` value from a whole number of cents.
    pub fn from_cents(cents: u64) -> Self {
        // Two decimal places by construction, so validation cannot fail
        Self(Decimal::new(
            i64::try_from(cents).unwrap_or(i64::MAX),
            2,
        ))
    }

    /// The underlying decimal amount.
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Durable product metadata plus the canonical stock count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// The product's identity.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Optional display description.
    pub description: Option<String>,
    /// Unit price.
    pub price: Money,
    /// Canonical stock count. The source of truth for reconciliation.
    pub stock: u32,
}

impl Product {
    /// Creates a product with no description.
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            price,
            stock,
        }
    }

    /// Sets the display description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// The product catalog port.
///
/// An external collaborator: the purchase path only reads from it, and the
/// reconciler reads canonical stock through it. Implementations must not
/// assume a specific storage transport.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Looks up a product by id, returning `None` on a miss.
    async fn find_by_id(&self, product_id: &ProductId) -> CatalogResult<Option<Product>>;

    /// Lists every product, for reconciliation sweeps.
    async fn all_products(&self) -> CatalogResult<Vec<Product>>;

    /// Writes the canonical stock count for a product.
    async fn set_stock(&self, product_id: &ProductId, stock: u32) -> CatalogResult<()>;
}
