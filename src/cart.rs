//! Cart mutation API.
//!
//! Every mutation is a synchronous read-modify-write cycle against the
//! [`CartStore`]: the in-memory view changes first, then the full sequence is
//! persisted in one write, then subscribers are notified. There is no
//! cross-tab locking; two tabs on the same key race last-write-wins, which
//! is accepted; [`CartService::reload`] picks up external writes.
//!
//! Central invariant: the stored cart never contains two lines with the same
//! product id.

use rust_decimal::Decimal;

use crate::domain::events::{CartEvent, FeedbackSink};
use crate::domain::line_item::LineItem;
use crate::pricing::{compute_totals, PricingConfig, Totals};
use crate::storage::{CartStore, KeyValueStorage};
use crate::{Result, StorefrontError};

pub struct CartService<S: KeyValueStorage> {
    store: CartStore<S>,
    cart_key: String,
    items: Vec<LineItem>,
    subscribers: Vec<Box<dyn FeedbackSink>>,
}

impl<S: KeyValueStorage> CartService<S> {
    /// Creates the service and loads the persisted cart for `cart_key`.
    pub fn new(store: CartStore<S>, cart_key: impl Into<String>) -> Self {
        let cart_key = cart_key.into();
        let items = store.load(&cart_key);
        Self { store, cart_key, items, subscribers: Vec::new() }
    }

    /// Registers a feedback sink (toast renderer, counter badge, ...).
    /// Resolution happens here once, not per interaction.
    pub fn subscribe(&mut self, sink: Box<dyn FeedbackSink>) {
        self.subscribers.push(sink);
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines, the number shown on the badge.
    pub fn item_count(&self) -> u32 {
        self.items.iter().fold(0u32, |sum, item| sum.saturating_add(item.quantity))
    }

    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(LineItem::line_total).sum()
    }

    pub fn totals(&self, config: &PricingConfig) -> Totals {
        compute_totals(&self.items, config)
    }

    pub fn cart_key(&self) -> &str {
        &self.cart_key
    }

    /// Access to the underlying store, shared with draft/order-log helpers.
    pub fn store_mut(&mut self) -> &mut CartStore<S> {
        &mut self.store
    }

    /// Re-reads the persisted state, discarding the in-memory view. Used
    /// after an external write to the same key (another tab, another page).
    pub fn reload(&mut self) {
        self.items = self.store.load(&self.cart_key);
        self.emit(CartEvent::CounterChanged { count: self.item_count() });
    }

    /// Adds `item`, merging by id. When a line with the same id exists its
    /// quantity grows by `item.quantity`; title, price and image keep their
    /// originally stored values (first write wins: a stale page scrape must
    /// not overwrite correct data). Returns the new badge count.
    pub fn add_item(&mut self, item: LineItem) -> Result<u32> {
        if item.id.trim().is_empty() {
            // A zero-identity line could never merge and would duplicate an
            // "unknown" row on every add.
            self.emit(CartEvent::InvalidInput { reason: "missing product id".into() });
            return Err(StorefrontError::MissingProductId);
        }
        if item.quantity == 0 {
            self.emit(CartEvent::InvalidInput { reason: "quantity must be at least 1".into() });
            return Err(StorefrontError::InvalidQuantity);
        }

        let title = item.title.clone();
        match self.items.iter_mut().find(|line| line.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
            }
            None => self.items.push(item),
        }
        tracing::debug!(cart_key = %self.cart_key, %title, "item added to cart");

        self.persist();
        self.emit(CartEvent::ItemAdded { title });
        let count = self.item_count();
        self.emit(CartEvent::CounterChanged { count });
        Ok(count)
    }

    /// Removes the line with `id`. A missing id is a no-op, not an error.
    pub fn remove_item(&mut self, id: &str) {
        let before = self.items.len();
        self.items.retain(|line| line.id != id);
        if self.items.len() == before {
            return;
        }
        tracing::debug!(cart_key = %self.cart_key, %id, "item removed from cart");

        self.persist();
        self.emit(CartEvent::ItemRemoved { id: id.to_string() });
        self.emit(CartEvent::CounterChanged { count: self.item_count() });
    }

    /// Overwrites the quantity for `id`; zero behaves as removal. An unknown
    /// id is reported as a non-fatal condition and leaves the store untouched.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove_item(id);
            return;
        }
        match self.items.iter_mut().find(|line| line.id == id) {
            Some(line) => line.quantity = quantity,
            None => {
                tracing::debug!(cart_key = %self.cart_key, %id, "quantity update for unknown item");
                self.emit(CartEvent::ItemNotFound { id: id.to_string() });
                return;
            }
        }

        self.persist();
        self.emit(CartEvent::QuantityChanged { id: id.to_string(), quantity });
        self.emit(CartEvent::CounterChanged { count: self.item_count() });
    }

    /// Empties the cart. Always succeeds, even when already empty.
    pub fn clear(&mut self) {
        self.items.clear();
        self.store.clear(&self.cart_key);
        self.emit(CartEvent::Cleared);
        self.emit(CartEvent::CounterChanged { count: 0 });
    }

    /// Persists the current view. A failed write degrades the session to
    /// non-persistent mode: the in-memory cart stays ahead of storage and the
    /// UI is told; a reload will show the last successfully persisted state.
    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.cart_key, &self.items) {
            tracing::warn!(cart_key = %self.cart_key, %err, "cart not persisted");
            self.emit(CartEvent::StorageDegraded { detail: err.to_string() });
        }
    }

    fn emit(&self, event: CartEvent) {
        for sink in &self.subscribers {
            sink.notify(&event);
        }
    }
}
