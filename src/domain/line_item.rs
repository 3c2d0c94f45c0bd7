//! Cart line items and the normalization boundary for loosely-shaped records.
//!
//! Three generations of the storefront persisted carts with drifting field
//! names (`price` vs `sale_price` vs `unitPrice`, `image` vs `image_link`).
//! Everything entering the core passes through [`RawCartRecord::normalize`]
//! once; downstream code only ever sees the canonical [`LineItem`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One product entry in a cart. Identity is `id`; two entries with the same
/// `id` are always merged, never duplicated. `unit_price` is the price in
/// effect when the item was added (no live re-pricing).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: String,
    pub title: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub image_url: String,
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            unit_price,
            quantity,
            image_url: String::new(),
            added_at: Utc::now(),
        }
    }

    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Full-precision line total; display rounding happens at formatting.
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Persisted cart record as found in storage, tolerant of legacy shapes.
#[derive(Debug, Default, Deserialize)]
pub struct RawCartRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default, alias = "unitPrice")]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    #[serde(default)]
    pub price: Option<Decimal>,
    #[serde(default, alias = "image", alias = "imageUrl", alias = "image_link")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
}

impl RawCartRecord {
    /// Maps an arbitrary stored shape onto the canonical [`LineItem`].
    ///
    /// Returns `None` when the record carries no usable identity; such rows
    /// cannot participate in merges and are dropped at load time. Price
    /// precedence: canonical `unit_price` first, then the discounted
    /// `sale_price` when positive, then the regular `price`.
    pub fn normalize(self) -> Option<LineItem> {
        let id = self.id.filter(|id| !id.trim().is_empty())?;
        let unit_price = self
            .unit_price
            .or_else(|| self.sale_price.filter(|p| p.is_sign_positive() && !p.is_zero()))
            .or(self.price)
            .unwrap_or(Decimal::ZERO);
        Some(LineItem {
            id,
            title: self.title.unwrap_or_else(|| "Product".to_string()),
            unit_price,
            quantity: self.quantity.unwrap_or(1).max(1),
            image_url: self.image_url.unwrap_or_default(),
            added_at: self.added_at.unwrap_or_else(Utc::now),
        })
    }
}
