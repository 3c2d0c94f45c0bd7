//! Cart events and the UI feedback boundary.
//!
//! Mutations emit events at the point of change instead of consumers polling
//! storage. Toasts and cart counters subscribe through [`FeedbackSink`]; the
//! core never touches presentation directly.

use std::sync::Mutex;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartEvent {
    /// Total item count (sum of quantities) after a mutation.
    CounterChanged { count: u32 },
    ItemAdded { title: String },
    ItemRemoved { id: String },
    QuantityChanged { id: String, quantity: u32 },
    Cleared,
    /// Non-fatal: a quantity update referenced an id not in the cart.
    ItemNotFound { id: String },
    /// Rejected mutation input, e.g. a missing product id.
    InvalidInput { reason: String },
    /// Persistence failed; the session continues in non-persistent mode.
    StorageDegraded { detail: String },
    /// Catalog fetch exhausted its retries; an empty catalog was returned.
    CatalogUnavailable { detail: String },
}

/// Notification sink implemented by the UI layer.
pub trait FeedbackSink {
    fn notify(&self, event: &CartEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl FeedbackSink for NullSink {
    fn notify(&self, _event: &CartEvent) {}
}

/// Sink that records events, for tests and diagnostics.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<CartEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<CartEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn take(&self) -> Vec<CartEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn contains(&self, event: &CartEvent) -> bool {
        self.lock().contains(event)
    }
}

impl FeedbackSink for RecordingSink {
    fn notify(&self, event: &CartEvent) {
        self.lock().push(event.clone());
    }
}
