//! Order message serialization and the fulfillment deep link.
//!
//! There is no order API: the "wire format" is a structured text block a
//! human reads in a messaging app. The block is deterministic (identical
//! inputs produce byte-identical text), so the serializer takes no clock and
//! no randomness. Order ids and timestamps belong to [`OrderRecord`], the
//! best-effort local log written after hand-off.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use url::Url;

use crate::config::StoreConfig;
use crate::domain::customer::{Address, Customer};
use crate::domain::line_item::LineItem;
use crate::domain::value_objects::Money;
use crate::pricing::Totals;
use crate::storage::KeyValueStorage;
use crate::{Result, StorefrontError};

const RULE: &str = "=========================";

/// Renders the order as a line-oriented text block with fixed section order:
/// header, customer info, delivery address, itemized list, summary, optional
/// special instructions, footer.
///
/// Line totals are rounded to two places for display only; the summary block
/// uses the pricing engine's figures directly, so the rendered total always
/// equals `totals.total`. Optional fields (postal code, notes) are omitted
/// entirely rather than rendered as empty labels. Every interpolated field is
/// stripped of control characters, so the output contains none beyond `\n`,
/// and it is not percent-encoded; the link layer does that exactly once.
pub fn serialize(
    customer: &Customer,
    address: &Address,
    items: &[LineItem],
    totals: &Totals,
    notes: &str,
    config: &StoreConfig,
) -> String {
    let currency = config.currency.as_str();
    let mut message = String::new();

    let _ = writeln!(message, "Order Request - {}", config.store_name);
    message.push_str(RULE);
    message.push_str("\n\n");

    message.push_str("Customer Information:\n");
    let _ = writeln!(message, "Name: {}", field(&customer.full_name()));
    let _ = writeln!(message, "Email: {}", field(&customer.email));
    let _ = writeln!(message, "Phone: {}", field(&customer.phone));
    message.push('\n');

    message.push_str("Delivery Address:\n");
    let _ = writeln!(message, "Emirate: {}", field(&address.emirate));
    let _ = writeln!(message, "City: {}", field(&address.city));
    let _ = writeln!(message, "Address: {}", field(&address.street));
    if !address.postal_code.is_empty() {
        let _ = writeln!(message, "Postal Code: {}", field(&address.postal_code));
    }
    message.push('\n');

    message.push_str("Order Items:\n");
    for (index, item) in items.iter().enumerate() {
        let _ = writeln!(message, "{}. {}", index + 1, field(&item.title));
        let _ = writeln!(
            message,
            "   Price: {} x {} = {}",
            Money::new(item.unit_price, currency),
            item.quantity,
            Money::new(item.line_total(), currency),
        );
    }
    message.push('\n');

    message.push_str("Order Summary:\n");
    let _ = writeln!(message, "Subtotal: {}", Money::new(totals.subtotal, currency));
    if totals.free_shipping() {
        message.push_str("Shipping: Free\n");
    } else {
        let _ = writeln!(message, "Shipping: {}", Money::new(totals.shipping, currency));
    }
    let _ = writeln!(
        message,
        "Tax ({}% VAT): {}",
        (config.pricing.tax_rate * rust_decimal::Decimal::ONE_HUNDRED).normalize(),
        Money::new(totals.tax, currency),
    );
    let _ = writeln!(message, "Total: {}", Money::new(totals.total, currency));
    message.push('\n');

    if !notes.trim().is_empty() {
        message.push_str("Special Instructions:\n");
        let _ = writeln!(message, "{}", sanitize(notes));
        message.push('\n');
    }

    message.push_str(RULE);
    message.push('\n');
    message.push_str("Please confirm this order and provide delivery timeline.\n");
    let _ = write!(message, "Thank you for choosing {}!", config.store_name);

    message
}

/// Strips control characters (form notes can contain pasted carriage
/// returns); newlines inside notes are preserved.
fn sanitize(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| *c == '\n' || !c.is_control())
        .collect()
}

/// Single-line field: validation does not reject pasted control characters,
/// so they are stripped here, newlines included, to keep the line structure
/// intact.
fn field(text: &str) -> String {
    text.trim().chars().filter(|c| !c.is_control()).collect()
}

/// Builds the fulfillment channel link,
/// `https://wa.me/<recipient>?text=<encoded message>`. Encoding happens here
/// once; the serializer output goes in raw.
pub fn checkout_link(config: &StoreConfig, message: &str) -> Result<Url> {
    let base = format!("https://wa.me/{}", config.fulfillment_recipient);
    let mut url =
        Url::parse(&base).map_err(|err| StorefrontError::Config(err.to_string()))?;
    url.query_pairs_mut().append_pair("text", message);
    Ok(url)
}

// =============================================================================
// Local order log
// =============================================================================

/// Summary row appended to the local order log after a successful hand-off.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_name: String,
    pub phone: String,
    pub emirate: String,
    pub total: rust_decimal::Decimal,
    pub placed_at: DateTime<Utc>,
}

impl OrderRecord {
    pub fn new(customer: &Customer, address: &Address, totals: &Totals) -> Self {
        Self {
            order_id: generate_order_id(),
            customer_name: customer.full_name(),
            phone: customer.phone.clone(),
            emirate: address.emirate.clone(),
            total: totals.total,
            placed_at: Utc::now(),
        }
    }
}

/// Order ids follow the store's historical shape: `#<year><6 digits>`.
pub fn generate_order_id() -> String {
    format!("#{}{:06}", Utc::now().year(), rand::random::<u32>() % 1_000_000)
}

/// Appends to the order log under `key`. Best effort: a corrupt log restarts
/// empty, a failed write is logged and swallowed; the hand-off already
/// happened and must not be blocked.
pub fn append_to_order_log<S: KeyValueStorage>(storage: &mut S, key: &str, record: &OrderRecord) {
    let mut log: Vec<OrderRecord> = storage
        .get(key)
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    log.push(record.clone());
    match serde_json::to_string(&log) {
        Ok(json) => {
            if let Err(err) = storage.set(key, &json) {
                tracing::warn!(%key, %err, "order log not persisted");
            }
        }
        Err(err) => tracing::warn!(%err, "order log not serializable"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{compute_totals, PricingConfig};
    use crate::storage::MemoryStorage;
    use rust_decimal::Decimal;

    fn fixture() -> (Customer, Address, Vec<LineItem>, Totals, StoreConfig) {
        let customer = Customer {
            first_name: "Sara".into(),
            last_name: "Ahmed".into(),
            email: "sara@example.com".into(),
            phone: "+971501234567".into(),
        };
        let address = Address {
            emirate: "Dubai".into(),
            city: "Dubai".into(),
            street: "Al Wasl Road 12".into(),
            postal_code: String::new(),
        };
        let items = vec![
            LineItem::new("p1", "Rose Perfume", Decimal::new(4000, 2), 3),
            LineItem::new("w1", "Gold Watch", Decimal::new(199, 0), 1),
        ];
        let config = StoreConfig::default();
        let totals = compute_totals(&items, &config.pricing);
        (customer, address, items, totals, config)
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let (customer, address, items, totals, config) = fixture();
        let first = serialize(&customer, &address, &items, &totals, "", &config);
        let second = serialize(&customer, &address, &items, &totals, "", &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_sections_appear_in_fixed_order() {
        let (customer, address, items, totals, config) = fixture();
        let message = serialize(&customer, &address, &items, &totals, "ring twice", &config);
        let positions: Vec<usize> = [
            "Order Request",
            "Customer Information:",
            "Delivery Address:",
            "Order Items:",
            "Order Summary:",
            "Special Instructions:",
            "Thank you for choosing",
        ]
        .iter()
        .map(|section| message.find(section).expect(section))
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_items_are_numbered_from_one_with_line_totals() {
        let (customer, address, items, totals, config) = fixture();
        let message = serialize(&customer, &address, &items, &totals, "", &config);
        assert!(message.contains("1. Rose Perfume"));
        assert!(message.contains("   Price: 40.00 AED x 3 = 120.00 AED"));
        assert!(message.contains("2. Gold Watch"));
        assert!(message.contains("   Price: 199.00 AED x 1 = 199.00 AED"));
    }

    #[test]
    fn test_free_shipping_renders_literal_free() {
        let (customer, address, items, totals, config) = fixture();
        let message = serialize(&customer, &address, &items, &totals, "", &config);
        assert!(message.contains("Shipping: Free"));
        assert!(!message.contains("Shipping: 0.00"));
    }

    #[test]
    fn test_paid_shipping_renders_amount() {
        let (customer, address, _, _, config) = fixture();
        let items = vec![LineItem::new("p1", "Sample", Decimal::new(2000, 2), 1)];
        let totals = compute_totals(&items, &config.pricing);
        let message = serialize(&customer, &address, &items, &totals, "", &config);
        assert!(message.contains("Shipping: 10.00 AED"));
        assert!(message.contains("Tax (5% VAT): 1.00 AED"));
        assert!(message.contains("Total: 31.00 AED"));
    }

    #[test]
    fn test_blank_notes_omit_instructions_section() {
        let (customer, address, items, totals, config) = fixture();
        let message = serialize(&customer, &address, &items, &totals, "   ", &config);
        assert!(!message.contains("Special Instructions:"));
    }

    #[test]
    fn test_empty_postal_code_line_is_absent() {
        let (customer, address, items, totals, config) = fixture();
        let message = serialize(&customer, &address, &items, &totals, "", &config);
        assert!(!message.contains("Postal Code:"));

        let mut with_postal = address.clone();
        with_postal.postal_code = "00000".into();
        let message = serialize(&customer, &with_postal, &items, &totals, "", &config);
        assert!(message.contains("Postal Code: 00000"));
    }

    #[test]
    fn test_summary_total_matches_pricing_engine_exactly() {
        let (customer, address, items, totals, config) = fixture();
        let message = serialize(&customer, &address, &items, &totals, "", &config);
        let rendered = format!("Total: {}", Money::new(totals.total, &config.currency));
        assert!(message.contains(&rendered));
    }

    #[test]
    fn test_no_carriage_returns_in_output() {
        let (customer, address, items, totals, config) = fixture();
        let message =
            serialize(&customer, &address, &items, &totals, "line one\r\nline two", &config);
        assert!(!message.contains('\r'));
        assert!(message.contains("line one\nline two"));
    }

    #[test]
    fn test_control_chars_in_fields_are_stripped() {
        let (mut customer, mut address, mut items, totals, config) = fixture();
        customer.first_name = "Sara\r".into();
        address.street = "Al Wasl\x07 Road 12".into();
        items[0].title = "Rose\r\nPerfume".into();
        let message = serialize(&customer, &address, &items, &totals, "", &config);
        assert!(!message.contains('\r'));
        assert!(!message.contains('\x07'));
        assert!(message.contains("Name: Sara Ahmed"));
        assert!(message.contains("Address: Al Wasl Road 12"));
        assert!(message.contains("1. RosePerfume"));
    }

    #[test]
    fn test_checkout_link_encodes_once() {
        let (customer, address, items, totals, config) = fixture();
        let message = serialize(&customer, &address, &items, &totals, "", &config);
        let url = checkout_link(&config, &message).unwrap();
        assert_eq!(url.host_str(), Some("wa.me"));
        assert_eq!(url.path(), "/201110760081");
        // Decoding the single text parameter restores the exact message.
        let (_, decoded) = url.query_pairs().next().unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_order_id_shape() {
        let id = generate_order_id();
        assert!(id.starts_with('#'));
        assert_eq!(id.len(), 11);
    }

    #[test]
    fn test_order_log_appends_and_survives_corruption() {
        let (customer, address, _, totals, config) = fixture();
        let mut storage = MemoryStorage::new();
        storage.set(&config.order_log_key, "corrupt!").unwrap();
        let record = OrderRecord::new(&customer, &address, &totals);
        append_to_order_log(&mut storage, &config.order_log_key, &record);
        append_to_order_log(&mut storage, &config.order_log_key, &record);

        let log: Vec<OrderRecord> =
            serde_json::from_str(&storage.get(&config.order_log_key).unwrap()).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].customer_name, "Sara Ahmed");
    }
}
