//! Store configuration.
//!
//! Everything that varies per deployment lives here: storage keys (one cart
//! per locale), business constants, catalog feed URLs and the fulfillment
//! channel recipient. There is no environment-variable layer; a host
//! application deserializes this from its own settings or takes the defaults,
//! which mirror the original storefront.

use serde::{Deserialize, Serialize};

use crate::pricing::PricingConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store identity rendered into order-message headers and footers.
    pub store_name: String,
    /// Currency label appended to every formatted amount.
    pub currency: String,
    /// Namespaced storage key for the cart, e.g. `emirates-gifts-cart-en`.
    /// Carts under different keys are fully independent.
    pub cart_key: String,
    /// Storage key for the best-effort checkout form draft.
    pub form_draft_key: String,
    /// Storage key for the local order log.
    pub order_log_key: String,
    /// Recipient identifier for the messaging deep link (`wa.me/<recipient>`).
    pub fulfillment_recipient: String,
    pub pricing: PricingConfig,
    /// Product feed URLs, fetched and concatenated (fragrances, watches, ...).
    pub catalog_feeds: Vec<String>,
    /// Retries after the first failed fetch attempt.
    pub fetch_retries: u32,
    /// Fixed delay between fetch attempts.
    pub fetch_backoff_ms: u64,
}

impl StoreConfig {
    /// Cart storage key for another locale sharing this configuration.
    pub fn cart_key_for_locale(&self, locale: &str) -> String {
        format!("emirates-gifts-cart-{locale}")
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_name: "Emirates Gifts Store".to_string(),
            currency: "AED".to_string(),
            cart_key: "emirates-gifts-cart-en".to_string(),
            form_draft_key: "emirates-gifts-checkout-form-en".to_string(),
            order_log_key: "emirates-gifts-orders-log".to_string(),
            fulfillment_recipient: "201110760081".to_string(),
            pricing: PricingConfig::default(),
            catalog_feeds: vec![
                "https://sherow1982.github.io/emirates-gifts/data/otor.json".to_string(),
                "https://sherow1982.github.io/emirates-gifts/data/sa3at.json".to_string(),
            ],
            fetch_retries: 2,
            fetch_backoff_ms: 800,
        }
    }
}
