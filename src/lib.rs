//! Storefront Core
//!
//! Client-side cart and checkout-message pipeline for a bilingual
//! gifts/perfume/watch storefront. The "backend" is a human reading a
//! formatted order message delivered through a messaging deep link, so the
//! whole system state lives in a key-value storage medium on the client.
//!
//! ## Features
//! - Persistent cart store over a pluggable key-value medium
//! - Quantity-merge-by-id cart mutations with event notifications
//! - Pure pricing engine (subtotal, threshold shipping, tax)
//! - Deterministic order-message serialization and deep-link construction
//! - Defensive product-catalog fetching with bounded retries

use thiserror::Error;

pub mod cart;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod order;
pub mod pricing;
pub mod storage;

pub use cart::CartService;
pub use catalog::{CatalogClient, CatalogEntry};
pub use config::StoreConfig;
pub use domain::customer::{Address, CheckoutForm, Customer};
pub use domain::events::{CartEvent, FeedbackSink, NullSink};
pub use domain::line_item::LineItem;
pub use order::OrderRecord;
pub use pricing::{compute_totals, PricingConfig, Totals};
pub use storage::{CartStore, KeyValueStorage, MemoryStorage};

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("missing product identity")]
    MissingProductId,

    #[error("invalid quantity")]
    InvalidQuantity,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("catalog fetch failed: {0}")]
    Catalog(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

#[cfg(test)]
pub(crate) mod test_support {
    /// Opt-in log output for test runs, driven by `RUST_LOG`. Safe to call
    /// from any number of tests; only the first registration sticks.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }
}
