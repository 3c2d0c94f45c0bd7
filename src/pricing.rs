//! Pricing engine: pure total computation.
//!
//! Accumulation stays on full-precision [`Decimal`]; rounding to two places
//! belongs to the display layer. Currency conversion does not exist here:
//! one configured currency, with formatting layered on top.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::line_item::LineItem;

/// Business constants for total computation. Defaults mirror the storefront:
/// 5% VAT, free shipping from 50, flat fee 10 below that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    pub tax_rate: Decimal,
    pub free_shipping_threshold: Decimal,
    pub flat_shipping_fee: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(5, 2),
            free_shipping_threshold: Decimal::new(50, 0),
            flat_shipping_fee: Decimal::new(10, 0),
        }
    }
}

/// Derived totals. Never stored; always recomputed from current line items
/// so they cannot go stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl Totals {
    pub fn zero() -> Self {
        Self {
            subtotal: Decimal::ZERO,
            shipping: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
        }
    }

    pub fn free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Computes totals from line items and the configured constants.
///
/// The shipping threshold is hard: a subtotal exactly at the threshold ships
/// free, one cent below pays the full flat fee. An empty cart is all zeros,
/// not an error.
pub fn compute_totals(items: &[LineItem], config: &PricingConfig) -> Totals {
    if items.is_empty() {
        return Totals::zero();
    }
    let subtotal: Decimal = items.iter().map(LineItem::line_total).sum();
    let shipping = if subtotal >= config.free_shipping_threshold {
        Decimal::ZERO
    } else {
        config.flat_shipping_fee
    };
    let tax = subtotal * config.tax_rate;
    Totals { subtotal, shipping, tax, total: subtotal + shipping + tax }
}
