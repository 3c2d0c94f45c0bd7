//! Persistent cart store over a pluggable key-value medium.
//!
//! The medium mirrors the browser's key-value storage: string keys, string
//! values, no transactions, possibly disabled or out of quota. Corruption is
//! never fatal here: a cart that cannot be parsed is an empty cart.

use serde::de::DeserializeOwned;

use crate::domain::line_item::{LineItem, RawCartRecord};
use crate::{Result, StorefrontError};

/// Key-value storage boundary. Reads are infallible (an unavailable medium
/// reads as absent); only writes can fail, and those failures are recoverable.
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str);
}

/// In-memory storage, the session-local analog of browser storage.
///
/// Carries two failure toggles so the degraded paths can be exercised: the
/// medium can be marked unavailable outright, or capped to a byte quota.
#[derive(Debug)]
pub struct MemoryStorage {
    entries: std::collections::HashMap<String, String>,
    available: bool,
    quota_bytes: Option<usize>,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self { entries: Default::default(), available: true, quota_bytes: None }
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self { quota_bytes: Some(quota_bytes), ..Self::new() }
    }

    /// Simulates storage being disabled (private mode, blocked, etc).
    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    fn used_bytes(&self) -> usize {
        self.entries.values().map(String::len).sum()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        if !self.available {
            return None;
        }
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if !self.available {
            return Err(StorefrontError::Storage("storage is unavailable".into()));
        }
        if let Some(quota) = self.quota_bytes {
            let occupied = self.used_bytes() - self.entries.get(key).map_or(0, String::len);
            if occupied + value.len() > quota {
                return Err(StorefrontError::Storage("storage quota exceeded".into()));
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Cart persistence over a [`KeyValueStorage`]. One store serves any number
/// of cart keys; per-locale carts are just different keys.
#[derive(Debug)]
pub struct CartStore<S: KeyValueStorage> {
    storage: S,
}

impl<S: KeyValueStorage> CartStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Direct access to the medium, for collaborators sharing it (form
    /// drafts, the order log).
    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Loads the persisted cart under `key`. Absent key, malformed content
    /// and an unavailable medium all yield an empty cart; legacy records are
    /// normalized, rows without a usable id are dropped, and rows sharing an
    /// id collapse into one line (quantities summed, first row's descriptive
    /// fields kept), so a loaded cart never carries duplicate ids.
    pub fn load(&self, key: &str) -> Vec<LineItem> {
        let Some(raw) = self.storage.get(key) else {
            return Vec::new();
        };
        let records: Vec<RawCartRecord> = match parse_lenient(&raw) {
            Some(records) => records,
            None => {
                tracing::warn!(%key, "stored cart is not valid JSON, treating as empty");
                return Vec::new();
            }
        };
        let mut items: Vec<LineItem> = Vec::with_capacity(records.len());
        for item in records.into_iter().filter_map(RawCartRecord::normalize) {
            match items.iter_mut().find(|line| line.id == item.id) {
                Some(existing) => {
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => items.push(item),
            }
        }
        items
    }

    /// Serializes and persists the full sequence, replacing the prior value
    /// in a single write. No UI side effects here; that is the mutation
    /// API's job.
    pub fn save(&mut self, key: &str, items: &[LineItem]) -> Result<()> {
        let json = serde_json::to_string(items)
            .map_err(|err| StorefrontError::Storage(err.to_string()))?;
        self.storage.set(key, &json)
    }

    /// Drops the persisted cart entirely. Removal cannot fail.
    pub fn clear(&mut self, key: &str) {
        self.storage.remove(key);
    }
}

/// Parses JSON and tolerates a non-array top level by treating it as absent.
fn parse_lenient<T: DeserializeOwned>(raw: &str) -> Option<Vec<T>> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    if !value.is_array() {
        return None;
    }
    serde_json::from_value(value).ok()
}
